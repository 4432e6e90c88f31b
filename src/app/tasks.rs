//! Peticiones al API en hilos aparte; la UI recoge los resultados en cada frame.

use crate::api::{ApiError, DrillsApi};
use crate::model::{
    Drill, DrillId, GeneratedImage, GeneratedShort, HealthStatus, MediaKind, Short, Test,
    TestAttempt, TestId, TestStats, UploadedMedia,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Una sola tarea en vuelo por tipo: la UI desactiva el botón mientras tanto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    LoadDrills,
    CreateDrill,
    SaveDrill,
    DeleteDrill,
    UploadMedia,
    GenerateImage,
    LoadTests,
    SaveTest,
    DeleteTest,
    LoadStats,
    SubmitAttempt,
    LoadAttempts,
    LoadShorts,
    GenerateShort,
    DeleteShort,
    Health,
}

#[derive(Debug)]
pub enum TaskOutput {
    Drills(Result<Vec<Drill>, ApiError>),
    DrillCreated(Result<Drill, ApiError>),
    DrillSaved(Result<Drill, ApiError>),
    DrillDeleted(DrillId, Result<(), ApiError>),
    MediaUploaded {
        drill_id: DrillId,
        kind: MediaKind,
        result: Result<UploadedMedia, ApiError>,
    },
    ImageGenerated {
        drill_id: DrillId,
        result: Result<GeneratedImage, ApiError>,
    },
    Tests(Result<Vec<Test>, ApiError>),
    TestSaved(Result<Test, ApiError>),
    TestDeleted(TestId, Result<(), ApiError>),
    Stats(TestId, Result<TestStats, ApiError>),
    AttemptSubmitted(Result<TestAttempt, ApiError>),
    Attempts(TestId, Result<Vec<TestAttempt>, ApiError>),
    Shorts(Result<Vec<Short>, ApiError>),
    ShortGenerated(DrillId, Result<GeneratedShort, ApiError>),
    ShortDeleted(i64, Result<(), ApiError>),
    Health(Result<HealthStatus, ApiError>),
}

impl TaskOutput {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskOutput::Drills(_) => TaskKind::LoadDrills,
            TaskOutput::DrillCreated(_) => TaskKind::CreateDrill,
            TaskOutput::DrillSaved(_) => TaskKind::SaveDrill,
            TaskOutput::DrillDeleted(..) => TaskKind::DeleteDrill,
            TaskOutput::MediaUploaded { .. } => TaskKind::UploadMedia,
            TaskOutput::ImageGenerated { .. } => TaskKind::GenerateImage,
            TaskOutput::Tests(_) => TaskKind::LoadTests,
            TaskOutput::TestSaved(_) => TaskKind::SaveTest,
            TaskOutput::TestDeleted(..) => TaskKind::DeleteTest,
            TaskOutput::Stats(..) => TaskKind::LoadStats,
            TaskOutput::AttemptSubmitted(_) => TaskKind::SubmitAttempt,
            TaskOutput::Attempts(..) => TaskKind::LoadAttempts,
            TaskOutput::Shorts(_) => TaskKind::LoadShorts,
            TaskOutput::ShortGenerated(..) => TaskKind::GenerateShort,
            TaskOutput::ShortDeleted(..) => TaskKind::DeleteShort,
            TaskOutput::Health(_) => TaskKind::Health,
        }
    }
}

pub struct TaskRunner {
    api: Arc<dyn DrillsApi>,
    tx: Sender<TaskOutput>,
    rx: Receiver<TaskOutput>,
    in_flight: HashMap<TaskKind, usize>,
    repaint: Option<egui::Context>,
}

impl TaskRunner {
    pub fn new(api: Arc<dyn DrillsApi>) -> Self {
        let (tx, rx) = channel();
        Self {
            api,
            tx,
            rx,
            in_flight: HashMap::new(),
            repaint: None,
        }
    }

    /// Para despertar la UI cuando termina una tarea.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.in_flight.get(&kind).is_some_and(|n| *n > 0)
    }

    pub fn any_pending(&self) -> bool {
        self.in_flight.values().any(|n| *n > 0)
    }

    /// Lanza `job` en otro hilo. Devuelve `false` (y no lanza nada) si ya
    /// hay una tarea del mismo tipo en curso.
    pub fn spawn<F>(&mut self, kind: TaskKind, job: F) -> bool
    where
        F: FnOnce(&dyn DrillsApi) -> TaskOutput + Send + 'static,
    {
        if self.is_pending(kind) {
            log::debug!("{kind:?} ya en curso, ignorado");
            return false;
        }
        *self.in_flight.entry(kind).or_default() += 1;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        std::thread::spawn(move || {
            let output = job(api.as_ref());
            let _ = tx.send(output);
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
        true
    }

    /// Resultados terminados desde la última llamada; no bloquea.
    pub fn poll(&mut self) -> Vec<TaskOutput> {
        let outputs: Vec<TaskOutput> = self.rx.try_iter().collect();
        for output in &outputs {
            if let Some(n) = self.in_flight.get_mut(&output.kind()) {
                *n = n.saturating_sub(1);
            }
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use std::time::{Duration, Instant};

    fn wait_for(runner: &mut TaskRunner) -> Vec<TaskOutput> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let outputs = runner.poll();
            if !outputs.is_empty() || Instant::now() > deadline {
                return outputs;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn results_arrive_through_poll() {
        let api = Arc::new(FakeApi::with_drills(vec![Drill {
            id: 1,
            ..Default::default()
        }]));
        let mut runner = TaskRunner::new(api);
        assert!(runner.spawn(TaskKind::LoadDrills, |api| {
            TaskOutput::Drills(api.list_drills())
        }));
        assert!(runner.is_pending(TaskKind::LoadDrills));

        let outputs = wait_for(&mut runner);
        assert_eq!(outputs.len(), 1);
        match &outputs[0] {
            TaskOutput::Drills(Ok(drills)) => assert_eq!(drills.len(), 1),
            other => panic!("inesperado: {other:?}"),
        }
        assert!(!runner.any_pending());
    }

    #[test]
    fn same_kind_is_not_launched_twice() {
        let mut runner = TaskRunner::new(Arc::new(FakeApi::default()));
        let (gate_tx, gate_rx) = channel::<()>();
        assert!(runner.spawn(TaskKind::SaveDrill, move |api| {
            let _ = gate_rx.recv();
            TaskOutput::DrillSaved(api.create_drill())
        }));
        assert!(!runner.spawn(TaskKind::SaveDrill, |api| {
            TaskOutput::DrillSaved(api.create_drill())
        }));
        // Otro tipo sí puede ir en paralelo
        assert!(runner.spawn(TaskKind::Health, |api| TaskOutput::Health(api.health())));

        gate_tx.send(()).unwrap();
        let mut seen = Vec::new();
        while seen.len() < 2 {
            seen.extend(wait_for(&mut runner).into_iter().map(|o| o.kind()));
        }
        assert!(seen.contains(&TaskKind::SaveDrill));
        assert!(!runner.is_pending(TaskKind::SaveDrill));
    }
}
