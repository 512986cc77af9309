/// Formats the playing time of `frames` at `sample_rate` as `HH:MM:SS.mmm`.
/// Hours widen past two digits instead of wrapping.
pub fn duration_str(frames: u64, sample_rate: u32) -> String {
    if sample_rate == 0 {
        return "unknown".to_string();
    }

    let ms = (frames as u128 * 1000 / sample_rate as u128) as u64;
    let hours = ms / 3_600_000;
    let minutes = ms % 3_600_000 / 60_000;
    let seconds = ms % 60_000 / 1000;
    let milliseconds = ms % 1000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
}
