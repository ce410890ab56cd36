//! Access-control roles.

/// Capability attached to a caller, evaluated at the top of each
/// privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	/// The singular admin set at construction: listing, trade switch,
	/// operator management.
	Admin,
	/// Authorized to submit signed orders for execution, nothing else.
	Operator,
	/// No privileges.
	None,
}
