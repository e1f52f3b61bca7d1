/// Progress events emitted while building models and sweeping the
/// composition grid. Consumers (the CLI progress bar) subscribe through a
/// callback so the engine stays free of terminal concerns.
#[derive(Debug, Clone)]
pub enum Progress {
    ModelStart { phase: String },
    SurfaceStart { phase: String, rows: u64 },
    RowComplete,
    SurfaceFinish,
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}
