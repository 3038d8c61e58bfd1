// Entity Models
// "Identity persists, values change"
//
// - Member: stable ID + mutable name/status/fee + append-only performance history
// - MemberRegistry: ordered roster with an O(1) case-insensitive ID index

pub mod member;
pub mod registry;

pub use member::{
    FeeSchedule, KindTag, Member, MemberKind, MembershipStatus, PerformanceRecord,
};
pub use registry::MemberRegistry;
