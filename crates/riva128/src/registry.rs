//! Named device types, so a machine description can instantiate adapters by type name.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::Riva128Config;
use crate::device::{Riva128Device, Riva128Variant};
use crate::error::Riva128Error;
use crate::rom::RomSource;

/// Abstract parent of both adapter variants.
pub const TYPE_PCI_RIVA128: &str = "pci-riva128";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTypeInfo {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    /// `None` for abstract types, which cannot be instantiated.
    pub variant: Option<Riva128Variant>,
    pub hotpluggable: bool,
}

impl DeviceTypeInfo {
    pub fn is_abstract(&self) -> bool {
        self.variant.is_none()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device type {0:?} is already registered with a different definition")]
    Conflict(&'static str),

    #[error("parent type {parent:?} of {name:?} is not registered")]
    UnknownParent {
        name: &'static str,
        parent: &'static str,
    },

    #[error("unknown device type {0:?}")]
    UnknownType(String),

    #[error("device type {0:?} is abstract")]
    AbstractType(&'static str),

    #[error(transparent)]
    Realize(#[from] Riva128Error),
}

#[derive(Debug, Default)]
pub struct DeviceTypeRegistry {
    types: BTreeMap<&'static str, DeviceTypeInfo>,
}

impl DeviceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `info`. Registering an identical definition again is a no-op.
    pub fn register(&mut self, info: DeviceTypeInfo) -> Result<(), RegistryError> {
        if let Some(existing) = self.types.get(info.name) {
            return if *existing == info {
                Ok(())
            } else {
                Err(RegistryError::Conflict(info.name))
            };
        }
        if let Some(parent) = info.parent {
            if !self.types.contains_key(parent) {
                return Err(RegistryError::UnknownParent {
                    name: info.name,
                    parent,
                });
            }
        }
        tracing::debug!("registered device type {}", info.name);
        self.types.insert(info.name, info);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&DeviceTypeInfo> {
        self.types.get(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }

    /// Instantiates and realizes a concrete type.
    pub fn create(
        &self,
        name: &str,
        config: Riva128Config,
        roms: &dyn RomSource,
    ) -> Result<Riva128Device, RegistryError> {
        let info = self
            .lookup(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))?;
        let variant = info.variant.ok_or(RegistryError::AbstractType(info.name))?;
        Ok(Riva128Device::realize(variant, config, roms)?)
    }
}

fn variant_type(variant: Riva128Variant) -> DeviceTypeInfo {
    DeviceTypeInfo {
        name: variant.type_name(),
        parent: Some(TYPE_PCI_RIVA128),
        variant: Some(variant),
        hotpluggable: variant.hotpluggable(),
    }
}

/// Registers the abstract RIVA 128 parent and both concrete variants. Safe to call more than
/// once on the same registry.
pub fn register_riva128_types(registry: &mut DeviceTypeRegistry) -> Result<(), RegistryError> {
    registry.register(DeviceTypeInfo {
        name: TYPE_PCI_RIVA128,
        parent: None,
        variant: None,
        hotpluggable: false,
    })?;
    registry.register(variant_type(Riva128Variant::Primary))?;
    registry.register(variant_type(Riva128Variant::Secondary))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::MemoryRomSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = DeviceTypeRegistry::new();
        register_riva128_types(&mut registry).unwrap();
        register_riva128_types(&mut registry).unwrap();

        let names: Vec<_> = registry.type_names().collect();
        assert_eq!(names, vec!["pci-riva128", "riva128", "secondary-riva128"]);
        assert!(registry.lookup("pci-riva128").unwrap().is_abstract());
        assert!(!registry.lookup("riva128").unwrap().hotpluggable);
        assert!(registry.lookup("secondary-riva128").unwrap().hotpluggable);
    }

    #[test]
    fn conflicting_and_orphan_definitions_are_rejected() {
        let mut registry = DeviceTypeRegistry::new();
        assert!(matches!(
            registry.register(variant_type(Riva128Variant::Primary)),
            Err(RegistryError::UnknownParent {
                name: "riva128",
                parent: TYPE_PCI_RIVA128
            })
        ));

        register_riva128_types(&mut registry).unwrap();
        let mut altered = variant_type(Riva128Variant::Primary);
        altered.hotpluggable = true;
        assert!(matches!(
            registry.register(altered),
            Err(RegistryError::Conflict("riva128"))
        ));
    }

    #[test]
    fn create_instantiates_concrete_types_only() {
        let mut registry = DeviceTypeRegistry::new();
        register_riva128_types(&mut registry).unwrap();
        let roms = MemoryRomSource::new();
        let cfg = Riva128Config {
            vram_size_mb: 1,
            ..Riva128Config::default()
        };

        let dev = registry
            .create("secondary-riva128", cfg.clone(), &roms)
            .unwrap();
        assert_eq!(dev.variant(), Riva128Variant::Secondary);

        assert!(matches!(
            registry.create(TYPE_PCI_RIVA128, cfg.clone(), &roms),
            Err(RegistryError::AbstractType("pci-riva128"))
        ));
        assert!(matches!(
            registry.create("cirrus-vga", cfg.clone(), &roms),
            Err(RegistryError::UnknownType(name)) if name == "cirrus-vga"
        ));

        let missing_rom = Riva128Config {
            rom_file: "custom.bin".to_string(),
            ..cfg
        };
        assert!(matches!(
            registry.create("riva128", missing_rom, &roms),
            Err(RegistryError::Realize(Riva128Error::RomNotFound { .. }))
        ));
    }
}
