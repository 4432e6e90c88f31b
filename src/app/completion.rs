use super::*;

impl DrillApp {
    /// Se llama en cada frame: aplica los resultados de las tareas terminadas.
    pub fn poll_tasks(&mut self) {
        for output in self.tasks.poll() {
            self.apply_output(output);
        }
    }

    fn apply_output(&mut self, output: TaskOutput) {
        match output {
            TaskOutput::Drills(Ok(drills)) => {
                log::info!("{} drills cargados", drills.len());
                self.drills = drills;
                self.selection.retain_existing(&self.drills);
            }
            TaskOutput::DrillCreated(Ok(drill)) => {
                self.message = format!("✅ Drill #{} creado", drill.id);
                self.upsert_drill(drill.clone());
                self.open_editor(drill);
            }
            TaskOutput::DrillSaved(Ok(drill)) => {
                self.message = "✅ Guardado".into();
                if let Some(editor) = self.editor.as_mut().filter(|e| e.drill_id() == drill.id) {
                    editor.mark_saved(drill.clone());
                    if editor.is_dirty() {
                        self.message = "✅ Guardado. Hay cambios más recientes sin guardar.".into();
                    }
                }
                self.upsert_drill(drill);
            }
            TaskOutput::DrillSaved(Err(err)) => {
                // El borrador se queda como está para reintentar
                if let Some(editor) = self.editor.as_mut() {
                    editor.save_failed();
                }
                self.message = format!("{} Tus cambios siguen sin guardar.", err.user_message());
            }
            TaskOutput::DrillDeleted(id, Ok(())) => {
                self.drills.retain(|d| d.id != id);
                self.selection.retain_existing(&self.drills);
                self.message = format!("🗑 Drill #{id} borrado");
            }
            TaskOutput::MediaUploaded {
                drill_id,
                kind,
                result,
            } => {
                self.upload_next_queued();
                match result {
                    Ok(uploaded) => {
                        self.capture_message = format!("✅ {kind} subido");
                        self.set_drill_media(drill_id, kind, uploaded.url);
                    }
                    Err(err) => {
                        self.capture_message =
                            format!("{} Vuelve a intentarlo.", err.user_message());
                    }
                }
            }
            TaskOutput::ImageGenerated { drill_id, result } => match result {
                Ok(image) => {
                    self.capture_message = "✅ Imagen generada".into();
                    self.photographer = image.photographer.clone();
                    self.set_drill_media(drill_id, MediaKind::Image, image.url);
                }
                Err(err) => self.capture_message = err.user_message(),
            },
            TaskOutput::Tests(Ok(tests)) => {
                log::info!("{} tests cargados", tests.len());
                self.tests = tests;
                self.stats.retain(|id, _| self.tests.iter().any(|t| t.id == *id));
            }
            TaskOutput::TestSaved(Ok(test)) => {
                self.message = format!("✅ Test «{}» guardado", test.title);
                match self.tests.iter_mut().find(|t| t.id == test.id) {
                    Some(slot) => *slot = test,
                    None => self.tests.push(test),
                }
                self.test_form = None;
                self.selection.clear();
                self.state = AppState::Dashboard;
            }
            TaskOutput::TestSaved(Err(err)) => {
                self.form_error = Some(err.user_message());
            }
            TaskOutput::TestDeleted(id, Ok(())) => {
                self.tests.retain(|t| t.id != id);
                self.stats.remove(&id);
                self.attempts.remove(&id);
                self.message = "🗑 Test borrado".into();
            }
            TaskOutput::Stats(id, Ok(stats)) => {
                self.stats.insert(id, stats);
            }
            TaskOutput::Attempts(id, Ok(attempts)) => {
                self.attempts.insert(id, attempts);
            }
            TaskOutput::AttemptSubmitted(result) => match result {
                Ok(attempt) => {
                    self.quiz_feedback = "✅ Resultado guardado".into();
                    let test_id = attempt.test_id;
                    self.last_attempt = Some(attempt);
                    self.load_stats(test_id);
                }
                Err(err) => {
                    self.quiz_feedback =
                        format!("{} El resultado no se ha guardado.", err.user_message());
                }
            },
            TaskOutput::Shorts(Ok(shorts)) => {
                self.shorts = shorts;
            }
            TaskOutput::ShortGenerated(drill_id, Ok(short)) => {
                self.message = format!("🎬 Short generado para el drill #{drill_id}");
                log::info!("short {} en {}", short.id, short.video_path);
                self.load_shorts();
            }
            TaskOutput::ShortDeleted(id, Ok(())) => {
                self.shorts.retain(|s| s.id != id);
            }
            TaskOutput::Health(result) => {
                self.health_message = match result {
                    Ok(health) => format!(
                        "✅ {} ({})",
                        health.status,
                        health.service.unwrap_or_else(|| self.base_url().to_string())
                    ),
                    Err(err) => err.user_message(),
                };
            }
            // Errores de listados y borrados: línea de estado general
            TaskOutput::Drills(Err(err))
            | TaskOutput::DrillCreated(Err(err))
            | TaskOutput::DrillDeleted(_, Err(err))
            | TaskOutput::Tests(Err(err))
            | TaskOutput::TestDeleted(_, Err(err))
            | TaskOutput::Stats(_, Err(err))
            | TaskOutput::Attempts(_, Err(err))
            | TaskOutput::Shorts(Err(err))
            | TaskOutput::ShortGenerated(_, Err(err))
            | TaskOutput::ShortDeleted(_, Err(err)) => {
                log::error!("{err}");
                self.message = err.user_message();
            }
        }
    }

    pub fn open_test_form(&mut self, test: Option<&Test>) {
        self.test_form = Some(match test {
            Some(test) => TestForm::edit(test),
            None => TestForm::default(),
        });
        self.form_error = None;
        self.state = AppState::TestForm;
    }
}
