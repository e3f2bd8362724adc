//! Ordered, exclusively-owned frame sequence
//!
//! The store has no internal locking. Callers that share it across threads
//! must provide their own single-writer discipline.

use crate::frame::Frame;

/// Composited frames in display order plus the shared canvas size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStore {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas width (0 when empty and never set)
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height (0 when empty and never set)
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Append a frame at the tail.
    ///
    /// The first frame pushed into a store with no dimensions sets them.
    pub fn push(&mut self, frame: Frame) {
        if self.width == 0 && self.height == 0 {
            self.width = frame.width();
            self.height = frame.height();
        }
        self.frames.push(frame);
    }

    /// Non-owning lookup.
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    /// Remove one frame and hand it to the caller.
    ///
    /// Later frames shift down by one index. The frame's pixel buffer moves
    /// with it, it is not copied.
    pub fn steal(&mut self, index: usize) -> Option<Frame> {
        if index < self.frames.len() {
            Some(self.frames.remove(index))
        } else {
            None
        }
    }

    /// Move every frame, in order, onto the end of `dest`.
    pub fn steal_all(&mut self, dest: &mut Vec<Frame>) {
        dest.append(&mut self.frames);
    }

    /// Drop all frames and reset the canvas size.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.width = 0;
        self.height = 0;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }
}

impl<'a> IntoIterator for &'a FrameStore {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(gray: u8) -> Frame {
        Frame::new(2, 2, vec![gray; 16], 0.1).unwrap()
    }

    fn three_frames() -> FrameStore {
        let mut store = FrameStore::new();
        store.push(solid(10));
        store.push(solid(20));
        store.push(solid(30));
        store
    }

    #[test]
    fn test_push_sets_dimensions() {
        let store = three_frames();
        assert_eq!((store.width(), store.height()), (2, 2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_get_out_of_range() {
        let store = three_frames();
        assert!(store.get(2).is_some());
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_steal_moves_buffer_and_shifts() {
        let mut store = three_frames();
        let original_ptr = store.get(0).unwrap().pixels().as_ptr();

        let stolen = store.steal(0).unwrap();
        assert_eq!(stolen.pixels().as_ptr(), original_ptr);
        assert_eq!(stolen.pixels()[0], 10);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().pixels()[0], 20);

        let buffer = stolen.into_pixels();
        assert_eq!(buffer.as_ptr(), original_ptr);
        assert_eq!(buffer[0], 10);
    }

    #[test]
    fn test_steal_out_of_range() {
        let mut store = three_frames();
        assert!(store.steal(5).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_steal_all_preserves_order() {
        let mut store = three_frames();
        let mut dest = vec![solid(1)];
        store.steal_all(&mut dest);

        assert!(store.is_empty());
        let firsts: Vec<u8> = dest.iter().map(|f| f.pixels()[0]).collect();
        assert_eq!(firsts, vec![1, 10, 20, 30]);
    }

    #[test]
    fn test_clear_resets_dimensions() {
        let mut store = three_frames();
        store.clear();
        assert!(store.is_empty());
        assert_eq!((store.width(), store.height()), (0, 0));
    }
}
