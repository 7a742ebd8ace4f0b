/// Reviewer permission tier. Which workflow actions are visible for a given
/// annotation depends on the role of the user looking at it.
///
/// The role is always threaded through call sites explicitly; there is no
/// process-wide "current role" holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Role1,
    Role2,
    Role3,
    Role4,
    Role5,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Role1,
        UserRole::Role2,
        UserRole::Role3,
        UserRole::Role4,
        UserRole::Role5,
    ];

    pub fn from_id(id: u8) -> Option<UserRole> {
        match id {
            1 => Some(UserRole::Role1),
            2 => Some(UserRole::Role2),
            3 => Some(UserRole::Role3),
            4 => Some(UserRole::Role4),
            5 => Some(UserRole::Role5),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            UserRole::Role1 => 1,
            UserRole::Role2 => 2,
            UserRole::Role3 => 3,
            UserRole::Role4 => 4,
            UserRole::Role5 => 5,
        }
    }
}
