//! Borrador local de un drill, separado de la copia guardada.

use crate::api::{ApiError, DrillsApi};
use crate::model::{Drill, DrillId, DrillUpdate, MediaKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrillField {
    Tag,
    Catalan,
    Tachelhit,
    Arabic,
}

impl DrillField {
    pub const ALL: [DrillField; 4] = [
        DrillField::Catalan,
        DrillField::Tachelhit,
        DrillField::Arabic,
        DrillField::Tag,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrillField::Tag => "Etiqueta",
            DrillField::Catalan => "Catalán",
            DrillField::Tachelhit => "Tachelhit",
            DrillField::Arabic => "Árabe",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct DrillDraft {
    tag: String,
    text_catalan: String,
    text_tachelhit: String,
    text_arabic: String,
}

impl DrillDraft {
    fn from_drill(drill: &Drill) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            tag: text(&drill.tag),
            text_catalan: text(&drill.text_catalan),
            text_tachelhit: text(&drill.text_tachelhit),
            text_arabic: text(&drill.text_arabic),
        }
    }

    fn slot(&mut self, field: DrillField) -> &mut String {
        match field {
            DrillField::Tag => &mut self.tag,
            DrillField::Catalan => &mut self.text_catalan,
            DrillField::Tachelhit => &mut self.text_tachelhit,
            DrillField::Arabic => &mut self.text_arabic,
        }
    }

    /// Los medios no viajan para no pisar subidas.
    fn to_update(&self) -> DrillUpdate {
        DrillUpdate {
            tag: none_if_blank(&self.tag),
            text_catalan: none_if_blank(&self.text_catalan),
            text_tachelhit: none_if_blank(&self.text_tachelhit),
            text_arabic: none_if_blank(&self.text_arabic),
            ..Default::default()
        }
    }

    fn get(&self, field: DrillField) -> &str {
        match field {
            DrillField::Tag => &self.tag,
            DrillField::Catalan => &self.text_catalan,
            DrillField::Tachelhit => &self.text_tachelhit,
            DrillField::Arabic => &self.text_arabic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardOutcome {
    Discarded,
    NeedsConfirmation,
}

/// clean → dirty al editar; dirty → clean al guardar o al confirmar el descarte.
#[derive(Clone, Debug, Default)]
pub struct DrillEditor {
    persisted: Drill,
    draft: DrillDraft,
    dirty: bool,
    confirming_discard: bool,
    /// Lo último enviado al servidor y aún sin respuesta.
    in_flight: Option<DrillUpdate>,
}

fn none_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DrillEditor {
    pub fn begin_edit(drill: Drill) -> Self {
        Self {
            draft: DrillDraft::from_drill(&drill),
            persisted: drill,
            dirty: false,
            confirming_discard: false,
            in_flight: None,
        }
    }

    pub fn drill_id(&self) -> DrillId {
        self.persisted.id
    }

    pub fn persisted(&self) -> &Drill {
        &self.persisted
    }

    pub fn field(&self, field: DrillField) -> &str {
        self.draft.get(field)
    }

    pub fn set_field(&mut self, field: DrillField, value: impl Into<String>) {
        *self.draft.slot(field) = value.into();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_confirming_discard(&self) -> bool {
        self.confirming_discard
    }

    pub fn can_leave(&self) -> bool {
        !self.dirty
    }

    /// Borrador completo tal como se enviaría ahora.
    pub fn payload(&self) -> DrillUpdate {
        self.draft.to_update()
    }

    /// Payload a enviar; se recuerda para compararlo con la respuesta.
    pub fn begin_save(&mut self) -> DrillUpdate {
        let payload = self.payload();
        self.in_flight = Some(payload.clone());
        payload
    }

    pub fn save_failed(&mut self) {
        self.in_flight = None;
    }

    /// Guardado síncrono. Si falla, el borrador sigue ahí para reintentar.
    pub fn save(&mut self, api: &dyn DrillsApi) -> Result<(), ApiError> {
        let payload = self.begin_save();
        match api.update_drill(self.persisted.id, &payload) {
            Ok(saved) => {
                self.mark_saved(saved);
                Ok(())
            }
            Err(err) => {
                log::error!("no se pudo guardar el drill {}: {err}", self.persisted.id);
                self.save_failed();
                Err(err)
            }
        }
    }

    /// El servidor confirmó el guardado; su copia pasa a ser la de referencia.
    /// Lo tecleado mientras la petición estaba en vuelo se conserva y sigue
    /// pendiente de guardar.
    pub fn mark_saved(&mut self, saved: Drill) {
        let echoed = DrillDraft::from_drill(&saved);
        let sent = self.in_flight.take().unwrap_or_else(|| echoed.to_update());
        self.persisted = saved;
        self.confirming_discard = false;
        if self.payload() == sent {
            log::info!("drill {} guardado", self.persisted.id);
            self.draft = echoed;
            self.dirty = false;
        } else {
            log::info!(
                "drill {} guardado; hay cambios posteriores sin guardar",
                self.persisted.id
            );
            self.dirty = true;
        }
    }

    pub fn request_discard(&mut self) -> DiscardOutcome {
        if self.dirty {
            self.confirming_discard = true;
            DiscardOutcome::NeedsConfirmation
        } else {
            DiscardOutcome::Discarded
        }
    }

    pub fn confirm_discard(&mut self) {
        self.draft = DrillDraft::from_drill(&self.persisted);
        self.dirty = false;
        self.confirming_discard = false;
    }

    pub fn cancel_discard(&mut self) {
        self.confirming_discard = false;
    }

    /// Tras una subida: solo cambia la copia guardada, no el borrador.
    pub fn apply_media_url(&mut self, kind: MediaKind, url: String) {
        self.persisted.set_media_url(kind, url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;

    fn stored() -> Drill {
        Drill {
            id: 4,
            tag: Some("salutacions".into()),
            text_catalan: Some("hola".into()),
            text_tachelhit: Some("azul".into()),
            audio_url: Some("/media/audio/4.webm".into()),
            ..Default::default()
        }
    }

    #[test]
    fn edits_make_the_draft_dirty() {
        let mut editor = DrillEditor::begin_edit(stored());
        assert!(!editor.is_dirty());
        assert_eq!(editor.field(DrillField::Catalan), "hola");
        assert_eq!(editor.field(DrillField::Arabic), "");

        editor.set_field(DrillField::Arabic, "مرحبا");
        assert!(editor.is_dirty());
        assert!(!editor.can_leave());
        // La copia guardada no se toca
        assert_eq!(editor.persisted().text_arabic, None);
    }

    #[test]
    fn payload_sends_blank_as_null_and_omits_media() {
        let mut editor = DrillEditor::begin_edit(stored());
        editor.set_field(DrillField::Tag, "   ");
        let payload = editor.payload();
        assert_eq!(payload.tag, None);
        assert_eq!(payload.text_tachelhit.as_deref(), Some("azul"));
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("audio_url").is_none());
        assert!(json["tag"].is_null());
    }

    #[test]
    fn successful_save_cleans_the_draft() {
        let api = FakeApi::with_drills(vec![stored()]);
        let mut editor = DrillEditor::begin_edit(stored());
        editor.set_field(DrillField::Tachelhit, "azul fellak");
        editor.save(&api).unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(
            editor.persisted().text_tachelhit.as_deref(),
            Some("azul fellak")
        );
        assert_eq!(api.updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn edits_typed_during_a_save_survive_the_reply() {
        let mut editor = DrillEditor::begin_edit(stored());
        editor.set_field(DrillField::Catalan, "bon dia");
        let sent = editor.begin_save();
        editor.set_field(DrillField::Arabic, "صباح الخير");

        let echo = Drill {
            text_catalan: sent.text_catalan.clone(),
            ..stored()
        };
        editor.mark_saved(echo);
        assert!(editor.is_dirty());
        assert_eq!(editor.field(DrillField::Arabic), "صباح الخير");
        assert_eq!(editor.field(DrillField::Catalan), "bon dia");
        assert_eq!(editor.persisted().text_catalan.as_deref(), Some("bon dia"));
        assert_eq!(editor.persisted().text_arabic, None);

        // Sin rastro del envío se compara con lo que devolvió el servidor
        let mut editor = DrillEditor::begin_edit(stored());
        editor.set_field(DrillField::Tag, "menjar");
        let payload = editor.payload();
        editor.set_field(DrillField::Tachelhit, "tanmmirt");
        editor.mark_saved(Drill {
            tag: payload.tag,
            ..stored()
        });
        assert!(editor.is_dirty());
        assert_eq!(editor.field(DrillField::Tachelhit), "tanmmirt");
    }

    #[test]
    fn failed_save_keeps_the_draft() {
        let api = FakeApi::with_drills(vec![stored()]);
        api.fail_next_with(ApiError::Timeout);
        let mut editor = DrillEditor::begin_edit(stored());
        editor.set_field(DrillField::Catalan, "bon dia");

        assert_eq!(editor.save(&api), Err(ApiError::Timeout));
        assert!(editor.is_dirty());
        assert_eq!(editor.field(DrillField::Catalan), "bon dia");

        editor.save(&api).unwrap();
        assert!(editor.can_leave());
    }

    #[test]
    fn discarding_a_dirty_draft_needs_confirmation() {
        let mut editor = DrillEditor::begin_edit(stored());
        assert_eq!(editor.request_discard(), DiscardOutcome::Discarded);

        editor.set_field(DrillField::Catalan, "adéu");
        assert_eq!(editor.request_discard(), DiscardOutcome::NeedsConfirmation);
        assert!(editor.is_confirming_discard());
        editor.cancel_discard();
        assert_eq!(editor.field(DrillField::Catalan), "adéu");

        editor.request_discard();
        editor.confirm_discard();
        assert!(!editor.is_dirty());
        assert_eq!(editor.field(DrillField::Catalan), "hola");
    }

    #[test]
    fn uploaded_media_does_not_dirty_the_draft() {
        let mut editor = DrillEditor::begin_edit(stored());
        editor.apply_media_url(MediaKind::Image, "/media/images/4.jpg".into());
        assert!(!editor.is_dirty());
        assert_eq!(
            editor.persisted().image_url.as_deref(),
            Some("/media/images/4.jpg")
        );
    }
}
