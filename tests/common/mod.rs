use std::fs;
use std::path::{Path, PathBuf};

use lazytrace::diagnostics::{Frame, FunctionDescriptor, ModuleId};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

#[allow(dead_code)]
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("LAZYTRACE_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set LAZYTRACE_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Frame `name(Int64)` in module `Main`, at `file:line`.
#[allow(dead_code)]
pub fn user_frame(name: &str, file: &str, line: u32) -> Frame {
    Frame::new(FunctionDescriptor::new(name, ["Int64"]), file, line)
        .with_module(ModuleId::new("Main"))
}

/// `prefix` distinct frames, `repeats` copies of a `period`-frame block,
/// then `suffix` distinct frames.
#[allow(dead_code)]
pub fn recursive_trace(prefix: usize, period: usize, repeats: usize, suffix: usize) -> Vec<Frame> {
    let mut frames: Vec<Frame> = (0..prefix)
        .map(|i| user_frame(&format!("inner{}", i), "inner.jl", i as u32 + 1))
        .collect();
    for _ in 0..repeats {
        frames.extend((0..period).map(|i| user_frame(&format!("step{}", i), "loop.jl", i as u32 + 1)));
    }
    frames.extend((0..suffix).map(|i| user_frame(&format!("outer{}", i), "outer.jl", i as u32 + 1)));
    frames
}
