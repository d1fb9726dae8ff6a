/// Monotonic identifier source.
///
/// At compile time one allocator per compile unit hands out the numeric
/// element-id suffixes; at render time one allocator per render pass hands out
/// widget instance ids (`w0`, `w1`, ...).
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    prefix: String,
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: &str) -> Self {
        IdAllocator {
            prefix: prefix.to_string(),
            next: 0,
        }
    }

    pub fn next_index(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    pub fn next_id(&mut self) -> String {
        let index = self.next_index();
        format!("{}{}", self.prefix, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut ids = IdAllocator::with_prefix("w");
        assert_eq!(ids.next_id(), "w0");
        assert_eq!(ids.next_id(), "w1");
        assert_eq!(ids.next_index(), 2);
        assert_eq!(ids.next_id(), "w3");
    }

    #[test]
    fn test_independent_allocators_do_not_share_state() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_index();
        a.next_index();
        assert_eq!(b.next_index(), 0);
        assert_eq!(a.next_index(), 2);
    }
}
