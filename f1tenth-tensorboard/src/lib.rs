//! Writes training statistics of the f1tenth driver to TensorBoard.
use f1tenth_core::record::{Record, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Every record must carry the step key, `env_steps` by default, used as the
/// horizontal axis of all its scalars. The step travels as an `f32` scalar,
/// so it is exact up to 2^24 steps and rounded beyond.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "env_steps".to_string(),
        }
    }

    /// Sets the key of the step.
    pub fn step_key(mut self, v: impl Into<String>) -> Self {
        self.step_key = v.into();
        self
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// A record without the step key is dropped.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            None => {
                warn!("Record without {} is dropped", self.step_key);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            let RecordValue::Scalar(v) = v;
            self.writer.add_scalar(k, *v, step);
        }
        self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempdir::TempDir;

    #[test]
    fn test_write_scalars() -> Result<()> {
        let dir = TempDir::new("tensorboard")?;
        let logdir = dir.path().join("logs");
        let mut recorder = TensorboardRecorder::new(&logdir);

        let mut record = Record::from_scalar("env_steps", 300.0);
        record.insert("epsilon", RecordValue::Scalar(0.9));
        recorder.write(record);
        recorder.write(Record::from_scalar("loss", 0.1));

        let files = std::fs::read_dir(&logdir)?.collect::<Vec<_>>();
        assert!(!files.is_empty());
        Ok(())
    }
}
