//! Fixtures shared by unit tests

use std::fs;
use std::io::Write;
use std::path::Path;

/// Write a zip archive containing `files` (path, contents)
pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, body) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a gzip-compressed tarball containing `files` (path, contents)
pub fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, *name, body.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Read an archive fixture back as bytes
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.zip");
    write_zip(&path, files);
    fs::read(path).unwrap()
}

/// Same as [`zip_bytes`] for tar.gz
pub fn tar_gz_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.tar.gz");
    write_tar_gz(&path, files);
    fs::read(path).unwrap()
}

/// A prompter that replays canned answers and records every question
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub answers: std::collections::VecDeque<String>,
    pub confirms: std::collections::VecDeque<bool>,
    pub choices: std::collections::VecDeque<usize>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn with_answers(answers: &[&str]) -> Self {
        ScriptedPrompter {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn confirming(mut self, answers: &[bool]) -> Self {
        self.confirms = answers.iter().copied().collect();
        self
    }

    pub fn choosing(mut self, choices: &[usize]) -> Self {
        self.choices = choices.iter().copied().collect();
        self
    }

    /// Whether any question mentioned `needle`
    pub fn was_asked(&self, needle: &str) -> bool {
        self.asked.iter().any(|q| q.contains(needle))
    }
}

impl crate::prompt::Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> crate::Result<bool> {
        self.asked.push(message.to_string());
        Ok(self.confirms.pop_front().unwrap_or(default))
    }

    fn input(&mut self, message: &str) -> crate::Result<String> {
        self.asked.push(message.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn secret(&mut self, message: &str) -> crate::Result<String> {
        self.input(message)
    }

    fn choose(&mut self, message: &str, _items: &[&str], default: usize) -> crate::Result<usize> {
        self.asked.push(message.to_string());
        Ok(self.choices.pop_front().unwrap_or(default))
    }
}

/// A command runner driven by scripted responses
///
/// Responses are keyed by the full command line. Each key holds a queue;
/// the last entry repeats once the others are used up.
#[derive(Default)]
pub struct FakeRunner {
    programs: std::collections::HashSet<String>,
    failing: std::collections::HashSet<String>,
    responses: std::sync::Mutex<std::collections::HashMap<String, std::collections::VecDeque<crate::runtime::CommandOutput>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs that exist on the fake PATH
    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs.extend(programs.iter().map(|p| p.to_string()));
        self
    }

    /// Command lines that exit unsuccessfully
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    /// Queue a response for a command line
    pub fn responding(self, command: &str, success: bool, stdout: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(crate::runtime::CommandOutput {
                success,
                stdout: stdout.to_string(),
                stderr: String::new(),
            });
        self
    }

    /// Every command line run so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl crate::runtime::CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> crate::Result<crate::runtime::CommandOutput> {
        let line = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        if let Some(queue) = self.responses.lock().unwrap().get_mut(&line) {
            let output = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
            if let Some(output) = output {
                return Ok(output);
            }
        }
        if self.failing.contains(&line) {
            return Ok(crate::runtime::CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: format!("{} failed", line),
            });
        }
        if self.programs.contains(program) {
            return Ok(crate::runtime::CommandOutput {
                success: true,
                ..Default::default()
            });
        }
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, format!("{} not found", program)).into())
    }

    fn exists(&self, program: &str) -> bool {
        self.programs.contains(program)
    }
}

/// An in-memory log sink for asserting on formatted tracing output
#[derive(Clone, Default)]
pub struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route events at `level` and above on this thread into the sink
    pub fn install(&self, level: tracing::Level) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
