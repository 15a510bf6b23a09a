use serde::Serialize;

use super::domain::{DocumentSlot, UploadedFile};
use super::validation::FieldErrorKind;

/// Upper bound for a single document: 10 MiB.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

const IMAGE_OR_PDF: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png"];
const TEXT_DOCUMENT: &[&str] = &[".pdf", ".doc", ".docx"];

/// Static description of one document slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentRequirement {
    pub slot: DocumentSlot,
    pub title: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub accepted_types: &'static [&'static str],
    pub max_bytes: u64,
}

pub const DOCUMENT_REQUIREMENTS: [DocumentRequirement; 5] = [
    DocumentRequirement {
        slot: DocumentSlot::Transcript,
        title: "Academic Transcript",
        description: "Official transcript from your most recent educational institution",
        required: true,
        accepted_types: IMAGE_OR_PDF,
        max_bytes: MAX_DOCUMENT_BYTES,
    },
    DocumentRequirement {
        slot: DocumentSlot::Diploma,
        title: "Diploma/Certificate",
        description: "Copy of your highest degree or diploma",
        required: true,
        accepted_types: IMAGE_OR_PDF,
        max_bytes: MAX_DOCUMENT_BYTES,
    },
    DocumentRequirement {
        slot: DocumentSlot::Cv,
        title: "Curriculum Vitae (CV)",
        description: "Your current resume or CV",
        required: true,
        accepted_types: TEXT_DOCUMENT,
        max_bytes: MAX_DOCUMENT_BYTES,
    },
    DocumentRequirement {
        slot: DocumentSlot::Passport,
        title: "Passport Copy",
        description: "Copy of your passport identification page",
        required: true,
        accepted_types: IMAGE_OR_PDF,
        max_bytes: MAX_DOCUMENT_BYTES,
    },
    DocumentRequirement {
        slot: DocumentSlot::LanguageCertificate,
        title: "Language Certificate",
        description: "English/German proficiency certificate (IELTS, TOEFL, etc.)",
        required: false,
        accepted_types: IMAGE_OR_PDF,
        max_bytes: MAX_DOCUMENT_BYTES,
    },
];

impl DocumentSlot {
    pub fn requirement(self) -> &'static DocumentRequirement {
        match self {
            DocumentSlot::Transcript => &DOCUMENT_REQUIREMENTS[0],
            DocumentSlot::Diploma => &DOCUMENT_REQUIREMENTS[1],
            DocumentSlot::Cv => &DOCUMENT_REQUIREMENTS[2],
            DocumentSlot::Passport => &DOCUMENT_REQUIREMENTS[3],
            DocumentSlot::LanguageCertificate => &DOCUMENT_REQUIREMENTS[4],
        }
    }
}

impl DocumentRequirement {
    /// Accept or reject a picked file. Size is checked before type.
    pub fn check(&self, file: &UploadedFile) -> Result<(), FieldErrorKind> {
        if file.size_bytes > self.max_bytes {
            return Err(FieldErrorKind::FileTooLarge {
                max_bytes: self.max_bytes,
                size_bytes: file.size_bytes,
            });
        }

        let extension = file.extension();
        if !self.accepted_types.contains(&extension.as_str()) {
            return Err(FieldErrorKind::UnsupportedFileType {
                accepted: self.accepted_types.to_vec(),
            });
        }

        Ok(())
    }
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
