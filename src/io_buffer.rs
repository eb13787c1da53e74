//! Thread-safe FIFO decoupling producer and consumer rates
//!
//! All three operations serialize on one lock. `read` never blocks; an
//! empty buffer yields `None`. There is deliberately no backpressure: the
//! engine's one-chunk-per-poll pacing bounds production in practice.

use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct IoBuffer<T> {
    queue: Mutex<VecDeque<T>>,
}

impl<T> IoBuffer<T> {
    pub fn new() -> Self {
        IoBuffer {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Append; never blocks
    pub fn write(&self, item: T) {
        self.queue.lock().unwrap().push_back(item);
    }

    /// Pop the oldest item, or `None` when empty; never blocks
    pub fn read(&self) -> Option<T> {
        self.queue.lock().unwrap().pop_front()
    }

    pub fn size(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fifo_order() {
        let buf = IoBuffer::new();
        buf.write(1);
        buf.write(2);
        buf.write(3);
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.read(), Some(1));
        assert_eq!(buf.read(), Some(2));
        assert_eq!(buf.read(), Some(3));
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_empty_read_returns_none() {
        let buf: IoBuffer<String> = IoBuffer::new();
        assert_eq!(buf.read(), None);
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn test_concurrent_producers() {
        let buf = Arc::new(IoBuffer::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let buf = Arc::clone(&buf);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        buf.write(t * 100 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(buf.size(), 400);
        let mut seen = 0;
        while buf.read().is_some() {
            seen += 1;
        }
        assert_eq!(seen, 400);
    }
}
