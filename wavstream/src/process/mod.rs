/// Header decoding and encoding.
///
/// Provides [`decode_header`](codec::decode_header), the field-by-field state machine that
/// validates the canonical header, and its inverse [`encode_header`](codec::encode_header).
pub mod codec;

/// Size reconciliation for bytes after the sample region.
pub mod trailing;

/// Sample-region transforms.
///
/// Provides the [`Processor`](transform::Processor) driver and the
/// [`Transform`](transform::Transform) modes it applies.
pub mod transform;

/// Synthetic tone generation.
pub mod tone;
