//! Category policy: permission-only rules

use super::Policy;
use shared::models::Category;

pub struct CategoryPolicy;

impl Policy<Category> for CategoryPolicy {
    const RESOURCE: &'static str = "categories";
}
