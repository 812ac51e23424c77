//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` table. Run stages live in
//! `adapt_core::run::RunStage` because the pipeline's state machine needs
//! them without a database.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Name as seeded in the lookup table.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Review state of a HITL task.
    HitlTaskStatus {
        Pending = 1 => "pending",
        Approved = 2 => "approved",
        Rejected = 3 => "rejected",
    }
}

define_status_enum! {
    /// Background job status.
    JobStatus {
        Pending = 1 => "pending",
        Running = 2 => "running",
        Completed = 3 => "completed",
        Failed = 4 => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_seed_order() {
        assert_eq!(HitlTaskStatus::Pending.id(), 1);
        assert_eq!(HitlTaskStatus::Rejected.id(), 3);
        assert_eq!(JobStatus::Failed.id(), 4);
        assert_eq!(StatusId::from(JobStatus::Running), 2);
    }

    #[test]
    fn from_id_round_trips() {
        assert_eq!(HitlTaskStatus::from_id(2), Some(HitlTaskStatus::Approved));
        assert_eq!(JobStatus::from_id(3).map(JobStatus::name), Some("completed"));
        assert_eq!(JobStatus::from_id(9), None);
    }
}
