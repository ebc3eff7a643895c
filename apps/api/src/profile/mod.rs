// Persisted career entities, per-session drafts and the skill set.

pub mod drafts;
pub mod handlers;
pub mod skills;
pub mod store;
