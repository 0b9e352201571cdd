//! Fixed-capacity FIFO buffer of recent exchanges.

use std::collections::VecDeque;

use gupshup_types::chat::Exchange;

/// The last `capacity` exchanges of a conversation, oldest first.
///
/// Appending past capacity evicts the oldest exchange. A capacity of zero is
/// allowed and retains nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWindow {
    capacity: usize,
    exchanges: VecDeque<Exchange>,
}

impl MemoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            exchanges: VecDeque::with_capacity(capacity),
        }
    }

    /// Record one exchange, evicting from the front to stay within capacity.
    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);
        while self.exchanges.len() > self.capacity {
            self.exchanges.pop_front();
        }
    }

    /// Copy of the window contents, most recent last.
    pub fn snapshot(&self) -> Vec<Exchange> {
        self.exchanges.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(n: usize) -> Exchange {
        Exchange::new(format!("q{n}"), format!("a{n}"))
    }

    #[test]
    fn test_new_window_is_empty() {
        let window = MemoryWindow::new(5);
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert_eq!(window.capacity(), 5);
        assert!(window.snapshot().is_empty());
    }

    #[test]
    fn test_append_below_capacity_keeps_all() {
        let mut window = MemoryWindow::new(5);
        for n in 1..=3 {
            window.append(exchange(n));
        }
        let inputs: Vec<_> = window.iter().map(|e| e.input().to_string()).collect();
        assert_eq!(inputs, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_overflow_keeps_last_k_in_order() {
        let mut window = MemoryWindow::new(5);
        for n in 1..=7 {
            window.append(exchange(n));
        }

        let snapshot = window.snapshot();
        assert_eq!(snapshot.len(), 5);
        let inputs: Vec<_> = snapshot.iter().map(|e| e.input()).collect();
        assert_eq!(inputs, vec!["q3", "q4", "q5", "q6", "q7"]);
        assert!(!inputs.contains(&"q1"));
        assert!(!inputs.contains(&"q2"));
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut window = MemoryWindow::new(3);
        for n in 0..50 {
            window.append(exchange(n));
            assert!(window.len() <= 3);
        }
        assert_eq!(window.snapshot().last().unwrap().output(), "a49");
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut window = MemoryWindow::new(2);
        window.append(exchange(1));
        window.append(exchange(2));

        let first = window.snapshot();
        let second = window.snapshot();
        assert_eq!(first, second);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut window = MemoryWindow::new(0);
        window.append(exchange(1));
        assert!(window.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut window = MemoryWindow::new(4);
        window.append(exchange(1));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 4);
    }
}
