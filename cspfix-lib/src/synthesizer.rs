use crate::error::{ConvertError, ConvertResult};
use crate::model::style_model::ClassRule;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub const DEFAULT_PREFIX: &str = "cspfix";

const INITIAL_WIDTH: usize = 8;
const WIDEN_STEP: usize = 2;
const MAX_WIDTH: usize = 16;
const ATTEMPTS_PER_WIDTH: usize = 64;

/// Makes up class names that appear nowhere in the configured stylesheets and
/// appends their rules to the generated sheet.
pub struct ClassSynthesizer<R: Rng = StdRng> {
    rng: R,
    prefix: String,
}

impl ClassSynthesizer<StdRng> {
    pub fn from_entropy(prefix: impl Into<String>) -> Self {
        ClassSynthesizer::new(StdRng::from_entropy(), prefix)
    }
}

impl<R: Rng> ClassSynthesizer<R> {
    pub fn new(rng: R, prefix: impl Into<String>) -> Self {
        ClassSynthesizer {
            rng,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Draw a name that is not a substring of any file in `sources`.
    ///
    /// Missing or unreadable files count as empty.
    pub fn generate(&mut self, sources: &[PathBuf]) -> ConvertResult<String> {
        let contents: Vec<String> = sources
            .iter()
            .map(|path| {
                fs::read_to_string(path).unwrap_or_else(|e| {
                    debug!("{} treated as empty for name check: {}", path.display(), e);
                    String::new()
                })
            })
            .collect();
        self.generate_against(&contents)
    }

    /// Draw `{prefix}_{digits}` until it collides with none of `contents`.
    ///
    /// Starts at 8 digits and widens by 2 after 64 rejected draws, up to 16.
    pub fn generate_against(&mut self, contents: &[String]) -> ConvertResult<String> {
        let mut width = INITIAL_WIDTH;
        while width <= MAX_WIDTH {
            let upper = 10u64.pow(width as u32);
            for _ in 0..ATTEMPTS_PER_WIDTH {
                let digits = self.rng.gen_range(0..upper);
                let name = format!("{}_{:0width$}", self.prefix, digits, width = width);
                if contents.iter().all(|content| !content.contains(&name)) {
                    return Ok(name);
                }
                trace!("class name {} already taken", name);
            }
            width += WIDEN_STEP;
            debug!("widening generated class names to {} digits", width);
        }
        Err(ConvertError::NameSpaceExhausted {
            prefix: self.prefix.clone(),
        })
    }

    /// Pick a fresh name for `declarations` and append the rule to `sink`.
    ///
    /// The name check and the append run under the sink's lock.
    pub fn synthesize(
        &mut self,
        sources: &[PathBuf],
        sink: &Path,
        declarations: &str,
    ) -> ConvertResult<ClassRule> {
        let lock = sink_lock(sink);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let name = self.generate(sources)?;
        let rule = ClassRule {
            name,
            declarations: declarations.to_string(),
        };
        append_rule(sink, &rule)?;
        info!("added {} to {}", rule, sink.display());
        Ok(rule)
    }
}

/// Append `\n.name{declarations}` to `sink`, creating the file if needed.
pub fn append_rule(sink: &Path, rule: &ClassRule) -> ConvertResult<()> {
    let to_sink_error = |source: std::io::Error| ConvertError::SinkWrite {
        path: sink.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(sink)
        .map_err(to_sink_error)?;
    write!(file, "\n{}", rule).map_err(to_sink_error)
}

/// One mutex per sink path for the whole process.
fn sink_lock(sink: &Path) -> Arc<Mutex<()>> {
    static SINK_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = SINK_LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(sink.to_path_buf()).or_default())
}
