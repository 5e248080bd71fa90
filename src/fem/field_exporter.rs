use super::{FemMesh, FemState, PostProc};
use crate::base::SimError;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

/// Holds the fields of one time step, ready for output
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    /// Index of the time step (1 to n)
    pub index: usize,

    /// Time
    pub t: f64,

    /// Velocity projected onto the points (npoint)
    pub velocity: Vec<[f64; 2]>,

    /// Pressure of each cell (ncell)
    pub pressure: Vec<f64>,

    /// Saturation at each point (npoint)
    pub saturation: Vec<f64>,
}

impl Snapshot {
    /// Allocates a new instance with the current values in the state
    pub fn new(fem: &FemMesh, state: &FemState, index: usize) -> Self {
        let post = PostProc::new(fem);
        Snapshot {
            index,
            t: state.t,
            velocity: post.nodal_velocities(state),
            pressure: post.pressures(state),
            saturation: post.saturations(state),
        }
    }
}

/// Defines the trait for the persistence of results
///
/// The time stepper calls `export` after each converged step and `finish` once at the end of the run.
/// Failures are reported as `SimError::Export` holding the index of the snapshot that could not be written.
pub trait FieldExporter {
    /// Receives the fields of one time step
    fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError>;

    /// Completes the output (e.g., writes collection files)
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

/// Keeps all snapshots in memory
#[derive(Clone, Debug, Default)]
pub struct SnapshotRecorder {
    /// All snapshots in the order of export
    pub all: Vec<Snapshot>,

    /// Indicates that `finish` has been called
    pub finished: bool,
}

impl SnapshotRecorder {
    /// Allocates a new instance
    pub fn new() -> Self {
        SnapshotRecorder::default()
    }
}

impl FieldExporter for SnapshotRecorder {
    fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
        self.all.push(snapshot);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.finished = true;
        Ok(())
    }
}

/// Runs another exporter on a worker thread
///
/// The snapshots are sent through a channel; thus the (slow) output does not stall the next time step.
///
/// If the inner exporter fails, the worker stops receiving snapshots and calls `finish` on the inner
/// exporter (e.g., to write the collection files of the snapshots already exported). The failure,
/// with the index of the failing snapshot, is then reported by the next `export` call or by `finish`.
pub struct QueuedExporter<E: FieldExporter + Send + 'static> {
    sender: Option<Sender<Snapshot>>,
    handle: Option<JoinHandle<(E, Result<(), SimError>)>>,
    inner: Option<E>,
    failure: Option<SimError>,
    last_index: usize,
}

impl<E: FieldExporter + Send + 'static> QueuedExporter<E> {
    /// Allocates a new instance and starts the worker thread
    pub fn new(mut exporter: E) -> Self {
        let (sender, receiver) = mpsc::channel::<Snapshot>();
        let handle = thread::spawn(move || {
            let mut result = Ok(());
            for snapshot in receiver {
                if let Err(e) = exporter.export(snapshot) {
                    result = Err(e);
                    break;
                }
            }
            let finished = exporter.finish();
            (exporter, result.and(finished))
        });
        QueuedExporter {
            sender: Some(sender),
            handle: Some(handle),
            inner: None,
            failure: None,
            last_index: 0,
        }
    }

    /// Waits for the worker thread and returns the inner exporter
    ///
    /// Calls `finish` if needed.
    pub fn into_inner(mut self) -> Result<E, SimError> {
        self.join()?;
        match self.inner.take() {
            Some(exporter) => Ok(exporter),
            None => Err(self.error("the exporter is not available")),
        }
    }

    /// Closes the channel and waits for the worker thread
    ///
    /// Returns the failure of the worker, if any. Subsequent calls return the same result.
    fn join(&mut self) -> Result<(), SimError> {
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok((exporter, result)) => {
                    self.inner = Some(exporter);
                    if let Err(e) = result {
                        self.failure = Some(e);
                    }
                }
                Err(_) => self.failure = Some(self.error("the export thread has panicked")),
            }
        }
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Returns an export error associated with the last sent snapshot
    fn error(&self, reason: &str) -> SimError {
        SimError::Export {
            timestep: self.last_index,
            reason: reason.to_string(),
        }
    }
}

impl<E: FieldExporter + Send + 'static> FieldExporter for QueuedExporter<E> {
    fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
        let index = snapshot.index;
        let sent = match &self.sender {
            Some(sender) => sender.send(snapshot).is_ok(),
            None => return Err(self.error("the export queue is closed")),
        };
        if sent {
            self.last_index = index;
            Ok(())
        } else {
            // the worker has stopped; report its error
            self.join()
        }
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.join()
    }
}

impl<E: FieldExporter + Send + 'static> Drop for QueuedExporter<E> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.join();
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{FieldExporter, QueuedExporter, Snapshot, SnapshotRecorder};
    use crate::base::{Config, SampleMeshes, SimError};
    use crate::fem::{FemMesh, FemState};

    // fails at the second snapshot and counts the calls to finish
    struct FailingExporter {
        exported: Vec<usize>,
        n_finish: usize,
    }

    impl FieldExporter for FailingExporter {
        fn export(&mut self, snapshot: Snapshot) -> Result<(), SimError> {
            if self.exported.len() == 1 {
                return Err(SimError::Export {
                    timestep: snapshot.index,
                    reason: "disk is full".to_string(),
                });
            }
            self.exported.push(snapshot.index);
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SimError> {
            self.n_finish += 1;
            Ok(())
        }
    }

    fn snapshot(index: usize) -> Snapshot {
        Snapshot {
            index,
            t: 0.1 * (index as f64),
            velocity: vec![[1.0, 0.0]],
            pressure: vec![0.5],
            saturation: vec![0.25],
        }
    }

    #[test]
    fn snapshot_new_works() {
        let mesh = SampleMeshes::two_tri3();
        let config = Config::new();
        let fem = FemMesh::new(&mesh, &config).unwrap();
        let mut state = FemState::new(&fem);
        state.t = 0.5;
        state.uu[fem.layout.eq_p(1)] = 2.0;
        state.uu[fem.layout.eq_s(3)] = 0.75;
        let snap = Snapshot::new(&fem, &state, 7);
        assert_eq!(snap.index, 7);
        assert_eq!(snap.t, 0.5);
        assert_eq!(snap.velocity, &[[0.0, 0.0]; 4]);
        assert_eq!(snap.pressure, &[0.0, 2.0]);
        assert_eq!(snap.saturation, &[0.0, 0.0, 0.0, 0.75]);
    }

    #[test]
    fn recorder_works() {
        let mut recorder = SnapshotRecorder::new();
        recorder.export(snapshot(1)).unwrap();
        recorder.export(snapshot(2)).unwrap();
        recorder.finish().unwrap();
        assert_eq!(recorder.all.len(), 2);
        assert_eq!(recorder.all[1].index, 2);
        assert!(recorder.finished);
    }

    #[test]
    fn queued_exporter_works() {
        let mut queue = QueuedExporter::new(SnapshotRecorder::new());
        for i in 1..=5 {
            queue.export(snapshot(i)).unwrap();
        }
        queue.finish().unwrap();
        queue.finish().unwrap(); // idempotent
        let recorder = queue.into_inner().unwrap();
        assert!(recorder.finished);
        let indices: Vec<_> = recorder.all.iter().map(|s| s.index).collect();
        assert_eq!(indices, &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn queued_exporter_reports_the_failing_snapshot() {
        let mut queue = QueuedExporter::new(FailingExporter {
            exported: Vec::new(),
            n_finish: 0,
        });
        queue.export(snapshot(1)).unwrap();

        // the failure of snapshot 2 is seen by a later export or by finish
        let mut error = None;
        for i in 2..100 {
            if let Err(e) = queue.export(snapshot(i)) {
                error = Some(e);
                break;
            }
        }
        let error = match error {
            Some(e) => e,
            None => queue.finish().err().unwrap(),
        };
        let correct = SimError::Export {
            timestep: 2,
            reason: "disk is full".to_string(),
        };
        assert_eq!(error, correct);

        // finish reports the same failure
        assert_eq!(queue.finish().err(), Some(correct.clone()));

        // the inner exporter was finished after the failure
        let inner = queue.inner.take().unwrap();
        assert_eq!(inner.exported, &[1]);
        assert_eq!(inner.n_finish, 1);
    }
}
