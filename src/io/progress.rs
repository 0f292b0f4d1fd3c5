use once_cell::sync::OnceCell;
use std::sync::RwLock;

type ProgressFn = Box<dyn Fn(SeparateProgress) + Send + Sync + 'static>;

static PROGRESS: OnceCell<RwLock<Option<ProgressFn>>> = OnceCell::new();

/// Progress notifications emitted while a separation runs.
#[derive(Clone, Debug)]
pub enum SeparateProgress {
    /// A pipeline stage started.
    Stage(&'static str),
    /// Frame-level progress of the background estimation pass.
    Frames {
        done: usize,
        total: usize,
        percent: f32,
    },
    Finished,
}

/// Install a process-wide progress callback. The callback may be invoked from
/// worker threads and replaces any previously installed one.
pub fn set_separate_progress_callback<F>(f: F)
where
    F: Fn(SeparateProgress) + Send + Sync + 'static,
{
    let cell = PROGRESS.get_or_init(|| RwLock::new(None));
    *cell.write().expect("progress lock poisoned") = Some(Box::new(f));
}

pub(crate) fn emit_separate_progress(p: SeparateProgress) {
    if let Some(cell) = PROGRESS.get() {
        if let Some(cb) = cell.read().expect("progress lock poisoned").as_ref() {
            cb(p);
        }
    }
}
