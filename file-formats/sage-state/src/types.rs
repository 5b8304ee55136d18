use crate::error::Result;
use crate::persister::StatePersister;

/// A record with a fixed save-state layout
pub trait Persist {
    fn persist<P: StatePersister>(&mut self, persister: &mut P) -> Result<()>;
}

/// An enum stored as its `u32` discriminant
pub trait PersistEnum: Copy + Sized {
    fn to_u32(self) -> u32;
    fn from_u32(value: u32) -> Option<Self>;
}

/// Declare a `#[repr(u32)]` enum together with its [`PersistEnum`] mapping.
///
/// ```
/// sage_state::persist_enum! {
///     /// Wind behavior
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Motion {
///         Unused = 1,
///         PingPong = 2,
///     }
/// }
///
/// use sage_state::PersistEnum;
/// assert_eq!(Motion::from_u32(2), Some(Motion::PingPong));
/// assert_eq!(Motion::from_u32(0), None);
/// ```
#[macro_export]
macro_rules! persist_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $crate::PersistEnum for $name {
            fn to_u32(self) -> u32 {
                self as u32
            }

            fn from_u32(value: u32) -> Option<Self> {
                match value {
                    $(v if v == $value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persister::{StateReader, StateWriter};
    use crate::StateError;
    use std::io::Cursor;

    persist_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Shape {
            Point = 1,
            Line = 2,
            Sphere = 4,
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Sample {
        id: u32,
        enabled: bool,
    }

    impl Persist for Sample {
        fn persist<P: StatePersister>(&mut self, persister: &mut P) -> Result<()> {
            persister.persist_version("Sample", 1)?;
            persister.persist_u32("Id", &mut self.id)?;
            persister.persist_bool("Enabled", &mut self.enabled)
        }
    }

    #[test]
    fn test_persist_enum_mapping() {
        assert_eq!(Shape::Sphere.to_u32(), 4);
        assert_eq!(Shape::from_u32(2), Some(Shape::Line));
        assert_eq!(Shape::from_u32(3), None);
    }

    #[test]
    fn test_persist_enum_rejects_unknown() {
        let bytes = 3u32.to_le_bytes();
        let mut shape = Shape::Point;
        let err = StateReader::new(Cursor::new(&bytes[..]))
            .persist_enum("Shape", &mut shape)
            .unwrap_err();
        assert!(matches!(err, StateError::InvalidEnumValue { value: 3, .. }));
    }

    #[test]
    fn test_persist_object() {
        let mut writer = StateWriter::new(Vec::new());
        let mut sample = Sample {
            id: 42,
            enabled: true,
        };
        writer.persist_object("Sample", &mut sample).unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes, vec![1, 42, 0, 0, 0, 1]);

        let mut read = Sample::default();
        StateReader::new(Cursor::new(&bytes[..]))
            .persist_object("Sample", &mut read)
            .unwrap();
        assert_eq!(read, sample);
    }
}
