#![allow(non_snake_case)]

use super::*;
use std::ffi::OsStr;
use std::path::Path;
use tempfile::TempDir;

fn wrapper(output: &Path) -> ProtocErl {
    ProtocErl {
        executable: PathBuf::from("/opt/gpb/bin/protoc-erl"),
        output: output.to_path_buf(),
        include_paths: vec![PathBuf::from("proto"), PathBuf::from("vendor/proto")],
        header_include: None,
    }
}

#[cfg(unix)]
fn script(dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("protoc-erl");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn ProtocErl___from_config___requires_output_path() {
    let config = GeneratorConfig::default();

    let err = ProtocErl::from_config(&config).unwrap_err();

    assert!(matches!(err, GenError::MissingConfiguration(ref key) if key == "output_path"));
}

#[test]
fn ProtocErl___command___passes_gpb_flags_includes_then_files() {
    let gpb = wrapper(Path::new("src"));

    let cmd = gpb.command(&["a.proto".into(), "b/c.proto".into()]);
    let args: Vec<&OsStr> = cmd.get_args().collect();

    assert_eq!(cmd.get_program(), "/opt/gpb/bin/protoc-erl");
    assert_eq!(
        args,
        [
            "-pkgs",
            "-strbin",
            "-modname",
            "gleam_gpb",
            "-o-erl",
            "src",
            "-o-hrl",
            "src",
            "-I",
            "proto",
            "-I",
            "vendor/proto",
            "a.proto",
            "b/c.proto",
        ]
        .map(OsStr::new)
    );
}

#[test]
fn rewrite_include___replaces_only_gpb_header() {
    let source = "-module(gleam_gpb).\n-include(\"gpb.hrl\").\n-include(\"other.hrl\").\n";

    let rewritten = rewrite_include(source, "-include(\"../deps/gpb/include/gpb.hrl\").");

    assert_eq!(
        rewritten.as_deref(),
        Some("-module(gleam_gpb).\n-include(\"../deps/gpb/include/gpb.hrl\").\n-include(\"other.hrl\").\n")
    );
}

#[test]
fn rewrite_include___no_gpb_header___is_none() {
    let source = "-module(gleam_gpb).\n-include_lib(\"gpb/include/gpb.hrl\").\n";

    assert_eq!(rewrite_include(source, "-include(\"x.hrl\")."), None);
}

#[test]
fn ProtocErl___update_include___no_gpb_header___leaves_module_untouched() {
    let dir = TempDir::new().unwrap();
    let gpb = wrapper(dir.path());
    let source = "-module(gleam_gpb).\n-include_lib(\"gpb/include/gpb.hrl\").\n";
    fs::write(gpb.erl_path(), source).unwrap();

    gpb.update_include("vendor/gpb.hrl").unwrap();

    assert_eq!(fs::read_to_string(gpb.erl_path()).unwrap(), source);
}

#[test]
fn ProtocErl___update_include___rewrites_generated_module() {
    let dir = TempDir::new().unwrap();
    let gpb = wrapper(dir.path());
    fs::write(gpb.erl_path(), "-include(\"gpb.hrl\").\n").unwrap();

    gpb.update_include("gpb/include/gpb.hrl").unwrap();

    assert_eq!(
        fs::read_to_string(gpb.erl_path()).unwrap(),
        "-include(\"gpb/include/gpb.hrl\").\n"
    );
}

#[test]
fn ProtocErl___update_include___missing_module___is_codec_error() {
    let dir = TempDir::new().unwrap();
    let gpb = wrapper(dir.path());

    let err = gpb.update_include("x.hrl").unwrap_err();

    assert_eq!(err.error_code(), 5);
}

#[test]
fn ProtocErl___generate___no_files___does_not_run() {
    let dir = TempDir::new().unwrap();
    let mut gpb = wrapper(&dir.path().join("never"));

    gpb.generate(&[]).unwrap();

    assert!(!dir.path().join("never").exists());
}

#[test]
fn ProtocErl___generate___missing_executable___is_codec_error() {
    let dir = TempDir::new().unwrap();
    let mut gpb = ProtocErl {
        executable: dir.path().join("no-such-protoc-erl"),
        ..wrapper(dir.path())
    };

    let err = gpb.generate(&["a.proto".into()]).unwrap_err();

    assert!(matches!(err, GenError::CodecGenerator(ref m) if m.starts_with("cannot run")));
}

#[cfg(unix)]
#[test]
fn ProtocErl___generate___failure___surfaces_stderr_verbatim() {
    let dir = TempDir::new().unwrap();
    let mut gpb = ProtocErl {
        executable: script(&dir, "echo 'a.proto:3: syntax error' >&2\nexit 1"),
        ..wrapper(&dir.path().join("out"))
    };

    let err = gpb.generate(&["a.proto".into()]).unwrap_err();

    assert_eq!(err.to_string(), "codec generator failed: a.proto:3: syntax error");
}

#[cfg(unix)]
#[test]
fn ProtocErl___generate___success___creates_output_and_patches_header() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let mut gpb = ProtocErl {
        executable: script(
            &dir,
            "printf '%s\\n' '-module(gleam_gpb).' '-include(\"gpb.hrl\").' > \"$6/gleam_gpb.erl\"",
        ),
        header_include: Some("gpb/include/gpb.hrl".into()),
        ..wrapper(&out)
    };

    gpb.generate(&["a.proto".into()]).unwrap();

    assert_eq!(
        fs::read_to_string(out.join("gleam_gpb.erl")).unwrap(),
        "-module(gleam_gpb).\n-include(\"gpb/include/gpb.hrl\").\n"
    );
}
