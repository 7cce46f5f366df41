//! Symbol flag bits

use bitflags::bitflags;
use cb_syntax::{PassingDirection, RestrictionLevel, SharingMode, StorageSection};

bitflags! {
    /// Attributes attached to a symbol while it is built and decorated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u64 {
        /// Declared or inherited `GLOBAL`
        const GLOBAL = 1 << 0;
        /// `PUBLIC`
        const PUBLIC = 1 << 1;
        /// `PRIVATE`
        const PRIVATE = 1 << 2;
        /// Parameter passed `BY REFERENCE`
        const BY_REFERENCE = 1 << 3;
        /// Parameter passed `BY CONTENT`
        const BY_CONTENT = 1 << 4;
        /// Parameter passed `BY VALUE`
        const BY_VALUE = 1 << 5;
        /// `INPUT` parameter
        const INPUT = 1 << 6;
        /// `OUTPUT` parameter
        const OUTPUT = 1 << 7;
        /// `IN-OUT` parameter
        const INOUT = 1 << 8;
        /// `RETURNING` parameter
        const RETURNING = 1 << 9;
        /// Declared in WORKING-STORAGE
        const WORKING_STORAGE = 1 << 10;
        /// Declared in LINKAGE, or a procedure parameter
        const LINKAGE = 1 << 11;
        /// Declared in LOCAL-STORAGE
        const LOCAL_STORAGE = 1 << 12;
        /// Declared in the FILE SECTION
        const FILE_SECTION = 1 << 13;
        /// Declared in GLOBAL-STORAGE
        const GLOBAL_STORAGE = 1 << 14;
        /// Predefined type
        const BUILTIN_TYPE = 1 << 15;
        /// Carries a `REDEFINES` clause
        const REDEFINES = 1 << 16;
        /// `BLANK WHEN ZERO`
        const BLANK_WHEN_ZERO = 1 << 17;
        /// `JUSTIFIED`
        const JUSTIFIED = 1 << 18;
        /// `SYNCHRONIZED`
        const SYNC = 1 << 19;
        /// `SIGN SEPARATE`
        const SIGN_SEPARATE = 1 << 20;
        /// `EXTERNAL`
        const EXTERNAL = 1 << 21;
        /// `GROUP-USAGE NATIONAL`
        const GROUP_USAGE_NATIONAL = 1 << 22;
        /// Has a `VALUE` clause
        const HAS_ATOMIC_VALUE = 1 << 23;
        /// Field of a typedef
        const IN_TYPEDEF = 1 << 24;
        /// Typed by, or being, a `TYPEDEF STRONG`
        const STRONG_TYPEDEF = 1 << 25;
        /// Typed by, or being, a `TYPEDEF STRICT`
        const STRICT_TYPEDEF = 1 << 26;
        /// Typed by, or being, a plain `TYPEDEF`
        const WEAK_TYPEDEF = 1 << 27;
        /// Program nested in another program
        const NESTED_PROGRAM = 1 << 28;
        /// Program following another one in the same source
        const STACKED_PROGRAM = 1 << 29;
        /// First program of a source
        const MAIN_PROGRAM = 1 << 30;
        /// Detached by a program removal
        const REMOVED = 1 << 31;

        /// Visibility bits propagated from owners
        const VISIBILITY = Self::GLOBAL.bits() | Self::PUBLIC.bits() | Self::PRIVATE.bits();
        /// Section-origin bits
        const SECTION_ORIGIN = Self::WORKING_STORAGE.bits()
            | Self::LINKAGE.bits()
            | Self::LOCAL_STORAGE.bits()
            | Self::FILE_SECTION.bits()
            | Self::GLOBAL_STORAGE.bits();
        /// Restriction-level bits
        const RESTRICTION = Self::STRONG_TYPEDEF.bits()
            | Self::STRICT_TYPEDEF.bits()
            | Self::WEAK_TYPEDEF.bits();
    }
}

impl SymbolFlags {
    /// Section-origin flag of a data division section
    #[must_use]
    pub fn for_section(section: StorageSection) -> Self {
        match section {
            StorageSection::File => Self::FILE_SECTION,
            StorageSection::GlobalStorage => Self::GLOBAL_STORAGE,
            StorageSection::WorkingStorage => Self::WORKING_STORAGE,
            StorageSection::LocalStorage => Self::LOCAL_STORAGE,
            StorageSection::Linkage => Self::LINKAGE,
        }
    }

    /// Flag of a parameter sharing mode
    #[must_use]
    pub fn for_sharing(mode: SharingMode) -> Self {
        match mode {
            SharingMode::ByReference => Self::BY_REFERENCE,
            SharingMode::ByContent => Self::BY_CONTENT,
            SharingMode::ByValue => Self::BY_VALUE,
        }
    }

    /// Flag of a parameter direction
    #[must_use]
    pub fn for_direction(direction: PassingDirection) -> Self {
        match direction {
            PassingDirection::Input => Self::INPUT,
            PassingDirection::Output => Self::OUTPUT,
            PassingDirection::InOut => Self::INOUT,
        }
    }

    /// Flag of a typedef restriction level
    #[must_use]
    pub fn for_restriction(level: RestrictionLevel) -> Self {
        match level {
            RestrictionLevel::Strong => Self::STRONG_TYPEDEF,
            RestrictionLevel::Strict => Self::STRICT_TYPEDEF,
            RestrictionLevel::Weak => Self::WEAK_TYPEDEF,
        }
    }

    /// Restriction level recorded in these flags
    #[must_use]
    pub fn restriction(self) -> Option<RestrictionLevel> {
        if self.contains(Self::STRONG_TYPEDEF) {
            Some(RestrictionLevel::Strong)
        } else if self.contains(Self::STRICT_TYPEDEF) {
            Some(RestrictionLevel::Strict)
        } else if self.contains(Self::WEAK_TYPEDEF) {
            Some(RestrictionLevel::Weak)
        } else {
            None
        }
    }

    /// Data division section this symbol was declared in
    #[must_use]
    pub fn section(self) -> Option<StorageSection> {
        StorageSection::ALL
            .into_iter()
            .find(|section| self.contains(Self::for_section(*section)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_roundtrip() {
        for section in StorageSection::ALL {
            assert_eq!(SymbolFlags::for_section(section).section(), Some(section));
        }
        assert_eq!(SymbolFlags::GLOBAL.section(), None);
    }

    #[test]
    fn test_restriction_level() {
        let flags = SymbolFlags::GLOBAL | SymbolFlags::for_restriction(RestrictionLevel::Strict);
        assert_eq!(flags.restriction(), Some(RestrictionLevel::Strict));
        assert!(SymbolFlags::VISIBILITY.contains(SymbolFlags::GLOBAL));
    }
}
