// User lookup: find-or-create by email. No sessions are issued — callers
// keep the returned id for subsequent /messages calls.

pub mod handlers;
