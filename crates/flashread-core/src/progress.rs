/// Reading progress as an integer percentage.
///
/// Note this rounds, while [`crate::seek::seek_to_percent`] floors; the two are
/// not exact inverses near the ends of the stream.
pub fn percent(cursor: usize, len: usize) -> u8 {
    if len <= 1 {
        return 0;
    }
    let ratio = cursor as f64 / (len - 1) as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
