use ffshrink::engine::{
    AccelBackend, CommandRunner, ConversionTask, ConvertSettings, Converter, EncodingPolicy,
    RunStatus, StreamProbe, StreamProfile, WorkDir,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Convert a Command's arguments to owned strings
pub fn cmd_args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|arg| arg.to_string_lossy().to_string())
        .collect()
}

/// Convert a Command to a string for testing/assertions
pub fn cmd_to_string(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    format!("{} {}", program, cmd_args(cmd).join(" "))
}

/// Stands in for ffmpeg: records every invocation, writes a file at the
/// output path (like ffmpeg would, even when it later fails) and returns
/// scripted statuses. Once the script runs out every call succeeds.
#[derive(Default)]
pub struct MockRunner {
    script: RefCell<VecDeque<RunStatus>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl MockRunner {
    pub fn new(script: impl IntoIterator<Item = RunStatus>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Output path (last argument) of the nth call
    pub fn output_of(&self, n: usize) -> PathBuf {
        PathBuf::from(self.calls.borrow()[n].last().unwrap())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: Command) -> RunStatus {
        let args = cmd_args(&cmd);
        let output = PathBuf::from(args.last().expect("command has an output path"));
        self.calls.borrow_mut().push(args);

        fs::write(&output, b"mock media").expect("mock output is writable");
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(RunStatus::Success)
    }
}

/// StreamProbe returning a fixed profile and counting calls
pub struct FixedProbe {
    profile: StreamProfile,
    calls: Cell<usize>,
}

impl FixedProbe {
    pub fn new(profile: StreamProfile) -> Self {
        Self {
            profile,
            calls: Cell::new(0),
        }
    }

    pub fn unknown() -> Self {
        Self::new(StreamProfile::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl StreamProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> StreamProfile {
        self.calls.set(self.calls.get() + 1);
        self.profile.clone()
    }
}

impl StreamProbe for &FixedProbe {
    fn probe(&self, path: &Path) -> StreamProfile {
        (**self).probe(path)
    }
}

pub fn stream(width: u32, height: u32, pix_fmt: &str, codec: &str) -> StreamProfile {
    StreamProfile {
        width: Some(width),
        height: Some(height),
        pix_fmt: Some(pix_fmt.to_string()),
        codec_name: Some(codec.to_string()),
    }
}

pub fn compliant_stream() -> StreamProfile {
    stream(640, 360, "yuv420p", "h264")
}

pub fn hd_stream() -> StreamProfile {
    stream(1280, 720, "yuv420p", "h264")
}

pub fn settings(hwaccel: Option<AccelBackend>) -> ConvertSettings {
    ConvertSettings {
        policy: EncodingPolicy::default(),
        hwaccel,
        overwrite: false,
        skip_if_compliant: true,
    }
}

/// Input tree `<tmp>/in/Shows/...`, output root `<tmp>/out`, scratch `<tmp>/work`
pub struct Fixture {
    pub temp: TempDir,
    pub root: PathBuf,
    pub output_root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("in").join("Shows");
        let output_root = temp.path().join("out");
        fs::create_dir_all(&root).unwrap();
        Self {
            temp,
            root,
            output_root,
        }
    }

    /// Create a fake source file at `rel` under the input root
    pub fn add_source(&self, rel: &str) -> ConversionTask {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"source media").unwrap();
        ConversionTask::new(self.root.clone(), path, self.output_root.clone())
    }

    pub fn work_dir(&self) -> WorkDir {
        WorkDir::new(Some(&self.temp.path().join("work"))).unwrap()
    }

    pub fn converter<P: StreamProbe>(
        &self,
        settings: ConvertSettings,
        runner: MockRunner,
        prober: P,
    ) -> Converter<MockRunner, P> {
        Converter::new(settings, runner, prober, self.work_dir())
    }
}

/// Number of entries left in a converter's scratch directory
pub fn leftover_artifacts<R: CommandRunner, P: StreamProbe>(converter: &Converter<R, P>) -> usize {
    fs::read_dir(converter.work_dir()).unwrap().count()
}

pub fn has_hwaccel(args: &[String]) -> bool {
    args.iter().any(|a| a == "-hwaccel")
}

pub fn is_remux(args: &[String]) -> bool {
    args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "copy")
}

pub fn is_encode(args: &[String]) -> bool {
    args.windows(2).any(|w| w[0] == "-c:v" && w[1] == "libx264")
}
