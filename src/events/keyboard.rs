use bitflags::bitflags;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

bitflags! {
    /// Маска модификаторов в раскладке Clutter/GDK (как её отдаёт хост)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierMask: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
    }
}

impl fmt::Display for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        write!(f, "{}", names.join("+"))
    }
}

/// Клавиша-модификатор, которую пользователь может выбрать в настройках
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Super,
    Hyper,
    #[strum(serialize = "CapsLock", serialize = "Caps Lock")]
    CapsLock,
    Meta,
}

impl ModifierKey {
    pub fn mask(self) -> ModifierMask {
        match self {
            ModifierKey::Shift => ModifierMask::SHIFT,
            ModifierKey::Control => ModifierMask::CONTROL,
            ModifierKey::Alt => ModifierMask::MOD1,
            ModifierKey::Super => ModifierMask::SUPER,
            ModifierKey::Hyper => ModifierMask::HYPER,
            ModifierKey::CapsLock => ModifierMask::LOCK,
            ModifierKey::Meta => ModifierMask::META,
        }
    }
}
