//!
//! Permission bit flags and the operating mode that maps operation names onto them.
//!
//! In `rw` mode every write-family operation is covered by a single `WRITE` bit.
//! In `crud` mode writes are split into `UPDATE` (same bit as `WRITE`), `CREATE` and `DELETE`.

use crate::error::NspError;
use crate::types::PermissionMask;

/// Permission bit flags (bits 0-3 defined).
pub mod flags {
    use super::PermissionMask;

    /// No permission. A grant of `DENY` is still a grant: it overrides broader ancestors.
    pub const DENY: PermissionMask = 0;
    /// Permission to observe a namespace and everything below it.
    pub const READ: PermissionMask = 1 << 0; // 0b0001
    /// Permission to mutate. In crud mode this bit means `UPDATE`.
    pub const WRITE: PermissionMask = 1 << 1; // 0b0010
    /// Alias of `WRITE` used in crud mode.
    pub const UPDATE: PermissionMask = WRITE;
    /// Permission to create children (crud mode).
    pub const CREATE: PermissionMask = 1 << 2; // 0b0100
    /// Permission to delete (crud mode).
    pub const DELETE: PermissionMask = 1 << 3; // 0b1000

    pub const CRUD: PermissionMask = CREATE | READ | UPDATE | DELETE;
}

/// Operating mode deciding how abstract operation names map to flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Simple read/write permissions.
    #[default]
    Rw,
    /// Granular create/read/update/delete permissions.
    Crud,
}

impl Mode {
    /// Returns the flag that an operation named `op` requires in this mode.
    ///
    /// Accepted names are `read`/`view`, `write`, `create`/`add`, `update`/`change`
    /// and `delete` (case-insensitive).
    ///
    /// # Errors
    /// `NspError::UnknownOperation` for any other name.
    pub fn permission_flag_for(self, op: &str) -> Result<PermissionMask, NspError> {
        let op_lower = op.to_ascii_lowercase();
        let flag = match (self, op_lower.as_str()) {
            (_, "read") | (_, "view") => flags::READ,
            (Mode::Rw, "write" | "create" | "add" | "update" | "change" | "delete") => flags::WRITE,
            (Mode::Crud, "write" | "update" | "change") => flags::UPDATE,
            (Mode::Crud, "create" | "add") => flags::CREATE,
            (Mode::Crud, "delete") => flags::DELETE,
            _ => return Err(NspError::UnknownOperation(op.to_string())),
        };
        Ok(flag)
    }

    /// The union of every flag meaningful in this mode.
    pub fn all(self) -> PermissionMask {
        match self {
            Mode::Rw => flags::READ | flags::WRITE,
            Mode::Crud => flags::CRUD,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = NspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rw" => Ok(Mode::Rw),
            "crud" => Ok(Mode::Crud),
            other => Err(NspError::Usage(format!("unknown permission mode '{}'", other))),
        }
    }
}

/// Checks if a granted mask (`have`) satisfies a required mask (`need`).
///
/// Every bit of `need` must be present in `have`; overlapping on some bits is not enough.
/// Unlike capability rights, no bit implies another here: `WRITE` alone does not grant `READ`.
#[inline]
pub fn sufficient(have: PermissionMask, need: PermissionMask) -> bool {
    (have & need) == need
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sufficient_requires_every_bit() {
        assert!(sufficient(flags::READ | flags::WRITE, flags::READ));
        assert!(sufficient(flags::READ | flags::WRITE, flags::READ | flags::WRITE));
        assert!(!sufficient(flags::READ, flags::READ | flags::WRITE));
        assert!(!sufficient(flags::WRITE, flags::READ));
        assert!(!sufficient(flags::DENY, flags::READ));
    }

    #[test]
    fn test_sufficient_zero_need_always_holds() {
        assert!(sufficient(flags::DENY, 0));
        assert!(sufficient(flags::CRUD, 0));
    }

    #[test]
    fn test_rw_mode_maps_writes_to_write() {
        for op in ["write", "create", "add", "update", "change", "delete"] {
            assert_eq!(Mode::Rw.permission_flag_for(op), Ok(flags::WRITE), "op {}", op);
        }
        assert_eq!(Mode::Rw.permission_flag_for("read"), Ok(flags::READ));
        assert_eq!(Mode::Rw.permission_flag_for("VIEW"), Ok(flags::READ));
    }

    #[test]
    fn test_crud_mode_is_granular() {
        assert_eq!(Mode::Crud.permission_flag_for("create"), Ok(flags::CREATE));
        assert_eq!(Mode::Crud.permission_flag_for("add"), Ok(flags::CREATE));
        assert_eq!(Mode::Crud.permission_flag_for("update"), Ok(flags::UPDATE));
        assert_eq!(Mode::Crud.permission_flag_for("change"), Ok(flags::UPDATE));
        assert_eq!(Mode::Crud.permission_flag_for("delete"), Ok(flags::DELETE));
        assert_eq!(Mode::Crud.permission_flag_for("read"), Ok(flags::READ));
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        assert_eq!(
            Mode::Crud.permission_flag_for("publish"),
            Err(NspError::UnknownOperation("publish".into()))
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("crud".parse::<Mode>(), Ok(Mode::Crud));
        assert_eq!(" RW ".parse::<Mode>(), Ok(Mode::Rw));
        assert!("admin".parse::<Mode>().is_err());
        assert_eq!(Mode::Rw.all(), 3);
        assert_eq!(Mode::Crud.all(), 15);
    }
}
