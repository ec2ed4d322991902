//! Fixed emotion catalogue for the check-in form and the risk scoring.
//!
//! The Spanish labels are the pilot's literal vocabulary and are treated as
//! data. Catalogue order doubles as the tie-break rank for frequency
//! lookups.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Tranquilo,
    Feliz,
    Normal,
    Preocupado,
    Molesto,
    Triste,
    Cansado,
    Ansioso,
}

pub const EMOTIONS: [Emotion; 8] = [
    Emotion::Tranquilo,
    Emotion::Feliz,
    Emotion::Normal,
    Emotion::Preocupado,
    Emotion::Molesto,
    Emotion::Triste,
    Emotion::Cansado,
    Emotion::Ansioso,
];

pub const REASONS: [&str; 5] = ["Casa", "Amigos", "Clases", "Salud", "No sé / prefiero no decir"];

const FALLBACK_TOOL: [&str; 1] = ["Respira 3 veces lento (30s)."];

impl Emotion {
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Tranquilo => "Tranquilo",
            Emotion::Feliz => "Feliz",
            Emotion::Normal => "Normal",
            Emotion::Preocupado => "Preocupado",
            Emotion::Molesto => "Molesto",
            Emotion::Triste => "Triste",
            Emotion::Cansado => "Cansado",
            Emotion::Ansioso => "Ansioso",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Emotion::Tranquilo => "\u{1F60A}",
            Emotion::Feliz => "\u{1F603}",
            Emotion::Normal => "\u{1F610}",
            Emotion::Preocupado => "\u{1F61F}",
            Emotion::Molesto => "\u{1F621}",
            Emotion::Triste => "\u{1F622}",
            Emotion::Cansado => "\u{1F634}",
            Emotion::Ansioso => "\u{1F630}",
        }
    }

    /// Negative-valence labels counted toward the risk percentage.
    pub fn is_charged(self) -> bool {
        matches!(
            self,
            Emotion::Preocupado
                | Emotion::Molesto
                | Emotion::Triste
                | Emotion::Cansado
                | Emotion::Ansioso
        )
    }

    /// Position in the catalogue; used as the tie-break rank.
    pub fn rank(self) -> usize {
        EMOTIONS.iter().position(|e| *e == self).unwrap_or(EMOTIONS.len())
    }

    pub fn from_label(label: &str) -> Option<Emotion> {
        EMOTIONS.iter().copied().find(|e| e.label() == label)
    }

    /// Coping-tool instructions from the pilot's emotional toolkit.
    pub fn toolkit(self) -> &'static [&'static str] {
        match self {
            Emotion::Molesto => &[
                "Respiración del semáforo (1 min): Inhala 3s, retén 2s, exhala 4s (x3).",
                "Descarga rápida: aprieta puños 5s y suelta (x5).",
                "Escribe qué te molestó y rompe el papel (guiado).",
            ],
            Emotion::Ansioso => &[
                "Respiración 4–4–6: Inhala 4s, retén 4s, exhala 6s (x5).",
                "Visualización corta (1–2 min): imagina un lugar seguro con detalles.",
                "5-4-3-2-1: 5 cosas que ves, 4 que sientes, 3 que oyes, 2 que hueles, 1 que saboreas.",
            ],
            Emotion::Cansado => &[
                "Activación 60s: saltitos suaves + estiramiento de brazos.",
                "Música + movimiento guiado (1–2 min).",
                "Postura: espalda recta 10s (x5) + agua.",
            ],
            Emotion::Triste => &[
                "Validación: 'Lo que sientes importa. Respira conmigo 3 veces.'",
                "Rueda: ¿Qué necesito ahora? (descanso / hablar / agua / espacio).",
                "Escribe 1 cosa pequeña que te ayudaría hoy.",
            ],
            Emotion::Preocupado => &[
                "Lista rápida: 1 cosa que controlo hoy + 1 acción pequeña.",
                "Respiración cuadrada: 4s inhala, 4s retén, 4s exhala, 4s retén (x4).",
                "Frase ancla: 'Haré lo mejor con lo que tengo hoy.'",
            ],
            Emotion::Normal => {
                &["Mini check: 3 respiraciones profundas y define tu prioridad del día."]
            }
            Emotion::Feliz => &["Reto: comparte una cosa buena del día con alguien (30s)."],
            Emotion::Tranquilo => {
                &["Mantén: 30s de respiración lenta para sostener el estado."]
            }
        }
    }

    /// Stored form of the emotion, as submitted by the check-in form.
    pub fn composite(self) -> String {
        format!("{} {}", self.icon(), self.label())
    }
}

/// Recovers the label from a stored emotion value. Stored values are
/// "<icon> <label>" composites, but bare labels pass through unchanged, as
/// does anything unrecognized. Total by construction.
pub fn label_of(value: &str) -> &str {
    match value.split_once(' ') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => value,
    }
}

pub fn is_charged_label(label: &str) -> bool {
    Emotion::from_label(label).map(Emotion::is_charged).unwrap_or(false)
}

/// Toolkit lookup by label; uncatalogued labels get the generic breathing
/// instruction.
pub fn tools_for_label(label: &str) -> &'static [&'static str] {
    match Emotion::from_label(label) {
        Some(e) => e.toolkit(),
        None => &FALLBACK_TOOL,
    }
}

/// Tie-break rank for an arbitrary label: catalogue position, with unknown
/// labels ranked after the catalogue.
pub fn label_rank(label: &str) -> usize {
    Emotion::from_label(label).map(Emotion::rank).unwrap_or(EMOTIONS.len())
}
