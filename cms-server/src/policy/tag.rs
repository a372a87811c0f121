//! Tag policy: permission-only rules

use super::Policy;
use shared::models::Tag;

pub struct TagPolicy;

impl Policy<Tag> for TagPolicy {
    const RESOURCE: &'static str = "tags";
}
