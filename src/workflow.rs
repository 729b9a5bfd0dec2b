use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::{Config, TranslationDirection};
use crate::error::{Result, SubtransError};
use crate::progress::{ProgressSink, format_elapsed};
use crate::subtitle::{SubtitleDocument, single_line};
use crate::translate::{Translator, TranslatorFactory};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines in the document
    pub lines: usize,
    /// Lines sent to the translator
    pub translatable: usize,
    /// Lines kept in the original language after a failed translation
    pub fallbacks: usize,
    pub backup_path: PathBuf,
    pub elapsed: Duration,
}

pub struct Workflow {
    config: Config,
    translator: Box<dyn Translator>,
}

impl Workflow {
    pub fn new(config: Config) -> Self {
        let translator = TranslatorFactory::create_translator(config.translator.clone());
        Self::with_translator(config, translator)
    }

    pub fn with_translator(config: Config, translator: Box<dyn Translator>) -> Self {
        Self { config, translator }
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// `<path><suffix>`, where the original content is kept
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        append_to_path(path, &self.config.output.backup_suffix)
    }

    /// Translate a subtitle file in place, keeping the original under the backup path.
    ///
    /// Failed lines keep their original text. Any other error ends the run and
    /// is reported through `progress` before being returned.
    pub async fn translate_file(
        &self,
        path: &Path,
        direction: &TranslationDirection,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunSummary> {
        ensure_input(path)?;

        let started = Instant::now();
        match self.run(path, direction, progress, started).await {
            Ok(summary) => {
                progress.finish(&format!("Translated in {}", format_elapsed(summary.elapsed)));
                Ok(summary)
            }
            Err(e) => {
                progress.fail("Translation failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        path: &Path,
        direction: &TranslationDirection,
        progress: &mut dyn ProgressSink,
        started: Instant,
    ) -> Result<RunSummary> {
        let content = fs::read_to_string(path).await?;
        let mut document = SubtitleDocument::parse(&content);
        let records = document.translatable_lines();
        let total = records.len();

        info!(
            "Loaded {}: {} lines, {} to translate ({})",
            path.display(),
            document.len(),
            total,
            direction
        );
        progress.update(0, total);

        let mut translated = Vec::with_capacity(total);
        let mut fallbacks = 0;
        for (done, record) in records.into_iter().enumerate() {
            let text = match self.translator.translate(record.payload(), direction).await {
                Ok(text) if text.contains(['\n', '\r']) => {
                    debug!("Line {} came back on several lines, joining them", record.index + 1);
                    let joined = single_line(&text);
                    if joined.is_empty() {
                        fallbacks += 1;
                        record.payload().to_string()
                    } else {
                        joined
                    }
                }
                Ok(text) => text,
                Err(e) if e.is_recoverable() => {
                    warn!("Keeping line {} untranslated: {}", record.index + 1, e);
                    progress.warn(&format!(
                        "Line {} kept untranslated: {}",
                        record.index + 1,
                        e
                    ));
                    fallbacks += 1;
                    record.payload().to_string()
                }
                Err(e) => return Err(e),
            };
            translated.push((record.index, text));
            progress.update(done + 1, total);
        }

        document.reassemble(translated);

        let backup_path = self.backup_path(path);
        if backup_path.exists() {
            warn!("Overwriting existing backup {}", backup_path.display());
        }
        fs::rename(path, &backup_path)
            .await
            .map_err(|source| SubtransError::Backup {
                from: path.to_path_buf(),
                to: backup_path.clone(),
                source,
            })?;
        info!("Original kept as {}", backup_path.display());

        write_atomically(path, &document.render()).await?;

        let summary = RunSummary {
            lines: document.len(),
            translatable: total,
            fallbacks,
            backup_path,
            elapsed: started.elapsed(),
        };
        info!(
            "Wrote {} ({} of {} lines translated)",
            path.display(),
            summary.translatable - summary.fallbacks,
            summary.translatable
        );
        Ok(summary)
    }
}

/// Fail with `FileNotFound` unless `path` is an existing file
pub fn ensure_input(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SubtransError::FileNotFound(path.display().to_string()))
    }
}

fn append_to_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write through a temporary sibling so `path` is either complete or absent
async fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let temp_path = append_to_path(path, ".part");
    let write_err = |source: std::io::Error| SubtransError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Err(source) = fs::write(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(write_err(source));
    }
    fs::rename(&temp_path, path).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MockTranslator;
    use assert_fs::prelude::*;
    use async_trait::async_trait;

    const INPUT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello world\n\n2\n00:00:03,000 --> 00:00:04,000\nGoodbye";

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        async fn translate(&self, text: &str, _direction: &TranslationDirection) -> Result<String> {
            Ok(text.to_uppercase())
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        updates: Vec<(usize, usize)>,
        warnings: Vec<String>,
        finished: Option<String>,
        failed: Option<String>,
    }

    impl ProgressSink for RecordingProgress {
        fn update(&mut self, completed: usize, total: usize) {
            self.updates.push((completed, total));
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }

        fn finish(&mut self, message: &str) {
            self.finished = Some(message.to_string());
        }

        fn fail(&mut self, message: &str) {
            self.failed = Some(message.to_string());
        }
    }

    fn direction() -> TranslationDirection {
        "en:ru".parse().unwrap()
    }

    fn failing_translator() -> MockTranslator {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _| Err(SubtransError::ExternalTool("trans exited with 1".to_string())));
        translator
    }

    #[tokio::test]
    async fn test_translates_payload_lines_only() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let workflow = Workflow::with_translator(Config::default(), Box::new(UppercaseTranslator));
        let mut progress = RecordingProgress::default();
        let summary = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        file.assert("1\n00:00:01,000 --> 00:00:02,000\nHELLO WORLD\n\n2\n00:00:03,000 --> 00:00:04,000\nGOODBYE");
        dir.child("movie.srt_").assert(INPUT);
        assert!(!dir.path().join("movie.srt.part").exists());

        assert_eq!(summary.lines, 7);
        assert_eq!(summary.translatable, 2);
        assert_eq!(summary.fallbacks, 0);
        assert_eq!(summary.backup_path, dir.path().join("movie.srt_"));
        assert_eq!(progress.updates, vec![(0, 2), (1, 2), (2, 2)]);
        assert!(progress.finished.unwrap().starts_with("Translated in "));
        assert!(progress.failed.is_none());
    }

    struct MultiLineTranslator;

    #[async_trait]
    impl Translator for MultiLineTranslator {
        async fn translate(&self, text: &str, _direction: &TranslationDirection) -> Result<String> {
            Ok(format!("{}\nsecond", text.to_uppercase()))
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_multi_line_translation_keeps_line_count() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let workflow = Workflow::with_translator(Config::default(), Box::new(MultiLineTranslator));
        let mut progress = RecordingProgress::default();
        let summary = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        let output = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(output.split('\n').count(), INPUT.split('\n').count());
        assert_eq!(summary.lines, 7);
        file.assert("1\n00:00:01,000 --> 00:00:02,000\nHELLO WORLD second\n\n2\n00:00:03,000 --> 00:00:04,000\nGOODBYE second");
    }

    #[tokio::test]
    async fn test_blank_multi_line_translation_falls_back() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_, _| Ok("\n\n".to_string()));

        let workflow = Workflow::with_translator(Config::default(), Box::new(translator));
        let mut progress = RecordingProgress::default();
        let summary = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        assert_eq!(summary.fallbacks, 2);
        file.assert(INPUT);
    }

    #[tokio::test]
    async fn test_every_line_failing_keeps_content() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        let input = format!("{}\n", INPUT);
        file.write_str(&input).unwrap();

        let workflow = Workflow::with_translator(Config::default(), Box::new(failing_translator()));
        let mut progress = RecordingProgress::default();
        let summary = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        file.assert(input.clone());
        dir.child("movie.srt_").assert(input);
        assert_eq!(summary.fallbacks, 2);
        assert_eq!(progress.warnings.len(), 2);
        assert!(progress.warnings[0].starts_with("Line 3 kept untranslated"));
        assert!(progress.finished.is_some());
    }

    #[tokio::test]
    async fn test_single_failure_falls_back_for_that_line() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .withf(|text, _| text.to_string() == "Hello world")
            .times(1)
            .returning(|_, _| Err(SubtransError::ExternalTool("timeout".to_string())));
        translator
            .expect_translate()
            .withf(|text, direction| text.to_string() == "Goodbye" && direction.target() == "ru")
            .times(1)
            .returning(|_, _| Ok("До свидания".to_string()));

        let workflow = Workflow::with_translator(Config::default(), Box::new(translator));
        let mut progress = RecordingProgress::default();
        workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        file.assert("1\n00:00:01,000 --> 00:00:02,000\nHello world\n\n2\n00:00:03,000 --> 00:00:04,000\nДо свидания");
    }

    #[tokio::test]
    async fn test_non_recoverable_error_aborts_before_backup() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .times(1)
            .returning(|_, _| Err(SubtransError::Config("broken".to_string())));

        let workflow = Workflow::with_translator(Config::default(), Box::new(translator));
        let mut progress = RecordingProgress::default();
        let err = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, SubtransError::Config(_)));
        assert_eq!(progress.failed.as_deref(), Some("Translation failed"));
        file.assert(INPUT);
        assert!(!dir.path().join("movie.srt_").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_reported_without_progress() {
        let dir = assert_fs::TempDir::new().unwrap();
        let missing = dir.path().join("missing.srt");

        let workflow = Workflow::with_translator(Config::default(), Box::new(MockTranslator::new()));
        let mut progress = RecordingProgress::default();
        let err = workflow
            .translate_file(&missing, &direction(), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, SubtransError::FileNotFound(_)));
        assert!(progress.updates.is_empty());
        assert!(progress.failed.is_none());
        assert!(!dir.path().join("missing.srt_").exists());
    }

    #[tokio::test]
    async fn test_backup_failure_aborts_without_writing() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("movie.srt");
        file.write_str(INPUT).unwrap();

        let config = Config {
            output: crate::config::OutputConfig {
                backup_suffix: "/nested/backup".to_string(),
            },
            ..Config::default()
        };
        let workflow = Workflow::with_translator(config, Box::new(UppercaseTranslator));
        let mut progress = RecordingProgress::default();
        let err = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, SubtransError::Backup { .. }));
        assert_eq!(progress.failed.as_deref(), Some("Translation failed"));
        file.assert(INPUT);
    }

    #[tokio::test]
    async fn test_file_without_payload() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("empty.srt");
        file.write_str("1\n00:00:01,000 --> 00:00:02,000\n\n").unwrap();

        let workflow = Workflow::with_translator(Config::default(), Box::new(MockTranslator::new()));
        let mut progress = RecordingProgress::default();
        let summary = workflow
            .translate_file(file.path(), &direction(), &mut progress)
            .await
            .unwrap();

        assert_eq!(summary.translatable, 0);
        assert_eq!(progress.updates, vec![(0, 0)]);
        file.assert("1\n00:00:01,000 --> 00:00:02,000\n\n");
    }

    #[test]
    fn test_backup_path_uses_configured_suffix() {
        let config = Config {
            output: crate::config::OutputConfig {
                backup_suffix: "_1".to_string(),
            },
            ..Config::default()
        };
        let workflow = Workflow::with_translator(config, Box::new(MockTranslator::new()));
        assert_eq!(
            workflow.backup_path(Path::new("/tmp/movie.srt")),
            PathBuf::from("/tmp/movie.srt_1")
        );
    }

    #[test]
    fn test_ensure_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_input(&dir.path().join("nope.srt")),
            Err(SubtransError::FileNotFound(_))
        ));
        assert!(matches!(ensure_input(dir.path()), Err(SubtransError::FileNotFound(_))));

        let file = dir.path().join("movie.srt");
        std::fs::write(&file, "1").unwrap();
        assert!(ensure_input(&file).is_ok());
    }
}
