pub mod activity;
pub mod recommendations;
pub mod scoring;
pub mod shelves;
pub mod social;
pub mod taste_compare;
pub mod traits;
pub mod visibility;

pub use traits::TraitSignature;
pub use visibility::{resolve_access, Access, Area, VisibilityReport};

/// Applies offset/limit to an already ordered list
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_windows() {
        let items: Vec<i32> = (1..=5).collect();
        assert_eq!(paginate(items.clone(), 0, 2), vec![1, 2]);
        assert_eq!(paginate(items.clone(), 4, 10), vec![5]);
        assert!(paginate(items, 9, 3).is_empty());
    }
}
