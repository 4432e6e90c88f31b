use super::*;
use crate::selection::validate_search_phrase;

impl DrillApp {
    /// Recarga drills, tests y shorts.
    pub fn refresh_all(&mut self) {
        self.load_drills();
        self.load_tests();
        self.load_shorts();
    }

    pub fn load_drills(&mut self) {
        self.tasks
            .spawn(TaskKind::LoadDrills, |api| TaskOutput::Drills(api.list_drills()));
    }

    pub fn load_tests(&mut self) {
        self.tasks
            .spawn(TaskKind::LoadTests, |api| TaskOutput::Tests(api.list_tests()));
    }

    pub fn load_shorts(&mut self) {
        self.tasks
            .spawn(TaskKind::LoadShorts, |api| TaskOutput::Shorts(api.list_shorts()));
    }

    pub fn load_stats(&mut self, test_id: TestId) {
        self.tasks.spawn(TaskKind::LoadStats, move |api| {
            TaskOutput::Stats(test_id, api.test_stats(test_id))
        });
    }

    pub fn load_attempts(&mut self, test_id: TestId) {
        self.tasks.spawn(TaskKind::LoadAttempts, move |api| {
            TaskOutput::Attempts(test_id, api.list_test_attempts(Some(test_id)))
        });
    }

    pub fn check_health(&mut self) {
        self.health_message = "⏳ Comprobando...".into();
        self.tasks
            .spawn(TaskKind::Health, |api| TaskOutput::Health(api.health()));
    }

    /// Guarda la URL para el próximo arranque; vacía vuelve a la de por defecto.
    pub fn save_api_url_override(&mut self) {
        let value = self.settings_url_input.trim().trim_end_matches('/');
        self.prefs.api_url_override = (!value.is_empty()).then(|| value.to_string());
        self.health_message = match &self.prefs.api_url_override {
            Some(url) => format!("💾 Se usará {url} al reiniciar."),
            None => "💾 Se usará la URL por defecto al reiniciar.".into(),
        };
    }

    /// El servidor crea un drill vacío y se abre en el editor.
    pub fn create_drill(&mut self) {
        self.tasks.spawn(TaskKind::CreateDrill, |api| {
            TaskOutput::DrillCreated(api.create_drill())
        });
    }

    pub fn save_drill(&mut self) {
        if self.tasks.is_pending(TaskKind::SaveDrill) {
            return;
        }
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        let id = editor.drill_id();
        let payload = editor.begin_save();
        self.message = "⏳ Guardando...".into();
        self.tasks.spawn(TaskKind::SaveDrill, move |api| {
            TaskOutput::DrillSaved(api.update_drill(id, &payload))
        });
    }

    pub fn request_delete(&mut self, target: DeleteTarget) {
        self.confirm_delete = Some(target);
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.confirm_delete.take() else {
            return;
        };
        match target {
            DeleteTarget::Drill(id) => {
                self.tasks.spawn(TaskKind::DeleteDrill, move |api| {
                    TaskOutput::DrillDeleted(id, api.delete_drill(id))
                });
            }
            DeleteTarget::Test(id) => {
                self.tasks.spawn(TaskKind::DeleteTest, move |api| {
                    TaskOutput::TestDeleted(id, api.delete_test(id))
                });
            }
            DeleteTarget::Short(id) => {
                self.tasks.spawn(TaskKind::DeleteShort, move |api| {
                    TaskOutput::ShortDeleted(id, api.delete_short(id))
                });
            }
        }
    }

    /// Sube un blob ya capturado o leído de disco. Sin reintentos. Si ya hay
    /// una subida en curso, espera en cola a que termine.
    pub fn upload_blob(&mut self, drill_id: DrillId, kind: MediaKind, blob: MediaBlob) {
        if blob.is_empty() {
            self.capture_message = crate::api::ApiError::EmptyPayload.user_message();
            return;
        }
        let media = CapturedMedia {
            drill_id,
            kind,
            blob,
        };
        if self.tasks.is_pending(TaskKind::UploadMedia) {
            self.pending_uploads.push_back(media);
            log::info!("{kind} del drill {drill_id} en cola ({} pendientes)", self.pending_uploads.len());
            self.capture_message = format!(
                "⏳ {kind} en cola: se subirá al terminar la subida en curso ({} en espera).",
                self.pending_uploads.len()
            );
            return;
        }
        self.spawn_upload(media);
    }

    /// Lanza la siguiente subida en cola, si la hay.
    pub(crate) fn upload_next_queued(&mut self) {
        if self.tasks.is_pending(TaskKind::UploadMedia) {
            return;
        }
        if let Some(media) = self.pending_uploads.pop_front() {
            self.spawn_upload(media);
        }
    }

    fn spawn_upload(&mut self, media: CapturedMedia) {
        let CapturedMedia { drill_id, kind, .. } = media;
        self.capture_message = format!("⏳ Subiendo {kind} ({} KB)...", media.blob.len() / 1024);
        self.tasks.spawn(TaskKind::UploadMedia, move |api| {
            TaskOutput::MediaUploaded {
                drill_id,
                kind,
                result: crate::capture::upload_captured_media(api, &media),
            }
        });
    }

    /// Alternativa a grabar: subir un archivo del disco.
    pub fn upload_file(&mut self, drill_id: DrillId, kind: MediaKind, path: &std::path::Path) {
        match MediaBlob::from_file(path) {
            Ok(blob) => self.upload_blob(drill_id, kind, blob),
            Err(err) => {
                log::warn!("no se pudo leer {}: {err}", path.display());
                self.capture_message = format!("❌ No se pudo leer el archivo: {err}");
            }
        }
    }

    /// Archivo soltado sobre la ventana: el tipo sale de la extensión.
    pub fn upload_dropped_file(&mut self, drill_id: DrillId, path: &std::path::Path) {
        match MediaBlob::from_file(path) {
            Ok(blob) => match MediaKind::from_mime(blob.essence()) {
                Some(kind) => self.upload_blob(drill_id, kind, blob),
                None => {
                    self.capture_message =
                        format!("⚠ Tipo de archivo no reconocido: {}", path.display());
                }
            },
            Err(err) => {
                log::warn!("no se pudo leer {}: {err}", path.display());
                self.capture_message = format!("❌ No se pudo leer el archivo: {err}");
            }
        }
    }

    pub fn generate_image(&mut self, drill_id: DrillId) {
        let phrase = match validate_search_phrase(&self.search_phrase) {
            Ok(phrase) => phrase,
            Err(err) => {
                self.capture_message = format!("⚠ {err}");
                return;
            }
        };
        self.capture_message = "⏳ Buscando imagen...".into();
        self.tasks.spawn(TaskKind::GenerateImage, move |api| {
            TaskOutput::ImageGenerated {
                drill_id,
                result: api.generate_image(drill_id, &phrase),
            }
        });
    }

    pub fn generate_short(&mut self, drill_id: DrillId) {
        self.message = "⏳ Generando short...".into();
        self.tasks.spawn(TaskKind::GenerateShort, move |api| {
            TaskOutput::ShortGenerated(drill_id, api.generate_short(drill_id))
        });
    }

    /// Valida el formulario antes de tocar la red.
    pub fn submit_test_form(&mut self) {
        let Some(form) = &self.test_form else {
            return;
        };
        let input = match form.to_input(&self.selection) {
            Ok(input) => input,
            Err(err) => {
                self.form_error = Some(format!("⚠ {err}"));
                return;
            }
        };
        self.form_error = None;
        let editing = form.editing.as_ref().map(|t| t.id);
        self.tasks.spawn(TaskKind::SaveTest, move |api| {
            TaskOutput::TestSaved(match editing {
                Some(id) => api.update_test(id, &input),
                None => api.create_test(&input),
            })
        });
    }
}
