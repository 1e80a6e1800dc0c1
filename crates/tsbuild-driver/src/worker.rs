//! Background build worker
//!
//! One dedicated thread runs build pipelines one after another so callers
//! never block on file reads or the compiler. Triggers that arrive while a
//! build is running are queued, and when that build ends every queued
//! trigger is collapsed into a single follow-up build. Callers learn about
//! a build only when it has completed.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::compiler::Compiler;
use crate::pipeline::{run_build, BuildError, BuildReport};
use crate::settings::Settings;

/// Why a build was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A source file was saved
    Saved(PathBuf),
    /// Explicit request
    Requested,
}

/// Completion notice for one build
#[derive(Debug)]
pub struct BuildNotice {
    /// The most recent trigger folded into this build
    pub trigger: Trigger,
    /// How many additional queued triggers this build absorbed
    pub coalesced: usize,
    pub result: Result<BuildReport, BuildError>,
}

/// Handle to the build thread. Dropping it lets the current build finish
/// and then stops the thread.
pub struct BuildWorker {
    triggers: Option<Sender<Trigger>>,
    handle: Option<JoinHandle<()>>,
}

impl BuildWorker {
    /// Start the worker thread for the project at `root`
    pub fn spawn(
        root: PathBuf,
        settings: Settings,
        compiler: Box<dyn Compiler>,
    ) -> io::Result<(Self, Receiver<BuildNotice>)> {
        let (trigger_tx, trigger_rx) = mpsc::channel();
        let (notice_tx, notice_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("tsbuild-worker".to_string())
            .spawn(move || worker_loop(&root, &settings, compiler.as_ref(), trigger_rx, notice_tx))?;

        let worker = Self {
            triggers: Some(trigger_tx),
            handle: Some(handle),
        };
        Ok((worker, notice_rx))
    }

    /// Request a build. Returns `false` if the worker has stopped.
    pub fn trigger(&self, trigger: Trigger) -> bool {
        match &self.triggers {
            Some(tx) => tx.send(trigger).is_ok(),
            None => false,
        }
    }

    /// Stop accepting triggers, finish queued work, and wait for the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.triggers.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("build worker panicked");
            }
        }
    }
}

impl Drop for BuildWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    root: &std::path::Path,
    settings: &Settings,
    compiler: &dyn Compiler,
    triggers: Receiver<Trigger>,
    notices: Sender<BuildNotice>,
) {
    debug!(root = %root.display(), "build worker started");

    while let Ok(mut trigger) = triggers.recv() {
        let mut coalesced = 0;
        while let Ok(next) = triggers.try_recv() {
            coalesced += 1;
            trigger = next;
        }
        if coalesced > 0 {
            debug!(coalesced, "collapsed queued build triggers");
        }

        info!(?trigger, "build started");
        let result = run_build(root, settings, compiler);
        if let Err(e) = &result {
            error!("build aborted: {e}");
        }

        let notice = BuildNotice {
            trigger,
            coalesced,
            result,
        };
        if notices.send(notice).is_err() {
            debug!("nobody is listening for build results");
            break;
        }
    }

    debug!("build worker stopped");
}
