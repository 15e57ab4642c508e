/// An error type for the target encoder.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    /// The object slot does not exist.
    #[error("Object slot {0} is out of range, capacity is {1}")]
    SlotOutOfRange(usize, usize),

    /// The class index has no heatmap channel.
    #[error("Class index {0} is out of range, number of classes is {1}")]
    ClassOutOfRange(usize, usize),

    /// A box coordinate is NaN or infinite.
    #[error("Box has non-finite coordinates {0:?}")]
    NonFiniteBox([f32; 4]),
}
