// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

/// Create a (never rolling) file appender for `path_str`, creating the parent folder if
/// needed.
///
/// Note that if you wrap this up in a non blocking writer, log lines emitted right before
/// the process exits (eg: while the terminal is being restored) can be lost, so the
/// appender is used directly.
///
/// # Errors
///
/// Returns an error if:
/// - The path has no file name
/// - The parent directory can't be created (insufficient permissions)
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = Path::new(path_str);

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Log file path {} has no file name.", path.display())
    })?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent).map_err(|err| {
        miette::miette!(
            "Can't create log folder {}. Check that you have the required permissions: {err}",
            parent.display()
        )
    })?;

    Ok(tracing_appender::rolling::never(parent, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_create_in_nested_temp_folder() {
        let dir = std::env::temp_dir()
            .join(format!("r3bl_term_runtime_log_{}", std::process::id()))
            .join("nested");
        let file_path = dir.join("rt.log");

        let appender = try_create(file_path.to_str().unwrap());

        assert!(appender.is_ok());
        assert!(dir.exists());
        drop(std::fs::remove_dir_all(dir.parent().unwrap()));
    }

    #[test]
    fn test_try_create_rejects_path_without_file_name() {
        assert!(try_create("..").is_err());
    }
}
