//! Class information and bundled example recordings
//!
//! Display text for each diagnostic class, and the fixed set of example
//! heart-sound recordings served under `/sound/<filename>`.

use serde::Serialize;

use crate::api::types::ClassLabel;

/// Drag-and-drop data key identifying an internally dragged example by filename
pub const EXAMPLE_DRAG_KEY: &str = "application/vhd-sound-example";

/// MIME type assumed for bundled examples
pub const EXAMPLE_MIME_TYPE: &str = "audio/wav";

/// Shown alongside every analysis result
pub const MEDICAL_DISCLAIMER: &str = "This analysis is for informational purposes only and should \
not replace professional medical diagnosis. Please consult a healthcare provider for proper evaluation.";

/// Human-readable information for a class label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    pub label: ClassLabel,
    pub name: &'static str,
    pub description: &'static str,
}

/// Look up display information for a label
pub fn class_info(label: ClassLabel) -> ClassInfo {
    let (name, description) = match label {
        ClassLabel::As => ("Aortic Stenosis", "Narrowing of the aortic valve opening"),
        ClassLabel::Mr => ("Mitral Regurgitation", "Backward flow through the mitral valve"),
        ClassLabel::Ms => ("Mitral Stenosis", "Narrowing of the mitral valve opening"),
        ClassLabel::Mvp => ("Mitral Valve Prolapse", "Valve flaps bulge into the left atrium"),
        ClassLabel::N => ("Normal", "No valve abnormality detected"),
    };
    ClassInfo {
        label,
        name,
        description,
    }
}

/// One bundled example recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExampleFile {
    pub name: &'static str,
    pub filename: &'static str,
    #[serde(rename = "type")]
    pub label: ClassLabel,
}

/// Bundled examples, one per class
pub static EXAMPLE_FILES: [ExampleFile; 5] = [
    ExampleFile {
        name: "Aortic Stenosis",
        filename: "New_AS_029.wav",
        label: ClassLabel::As,
    },
    ExampleFile {
        name: "Mitral Regurgitation",
        filename: "New_MR_024.wav",
        label: ClassLabel::Mr,
    },
    ExampleFile {
        name: "Mitral Stenosis",
        filename: "New_MS_033.wav",
        label: ClassLabel::Ms,
    },
    ExampleFile {
        name: "Mitral Valve Prolapse",
        filename: "New_MVP_017.wav",
        label: ClassLabel::Mvp,
    },
    ExampleFile {
        name: "Normal Heart",
        filename: "New_N_020.wav",
        label: ClassLabel::N,
    },
];

/// Bundled examples, optionally restricted to one class
pub fn examples_for(label: Option<ClassLabel>) -> Vec<ExampleFile> {
    EXAMPLE_FILES
        .iter()
        .filter(|e| label.map_or(true, |l| e.label == l))
        .copied()
        .collect()
}

/// Find a bundled example by filename
pub fn find_example(filename: &str) -> Option<&'static ExampleFile> {
    EXAMPLE_FILES.iter().find(|e| e.filename == filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_for_label() {
        assert_eq!(examples_for(None).len(), EXAMPLE_FILES.len());

        let label: ClassLabel = "mvp".parse().unwrap();
        let examples = examples_for(Some(label));
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].filename, "New_MVP_017.wav");
    }

    #[test]
    fn test_every_label_has_an_example() {
        for label in ClassLabel::ALL {
            assert!(
                EXAMPLE_FILES.iter().any(|e| e.label == label),
                "missing example for {}",
                label
            );
        }
    }

    #[test]
    fn test_find_example() {
        let example = find_example("New_MVP_017.wav").unwrap();
        assert_eq!(example.label, ClassLabel::Mvp);
        assert!(find_example("missing.wav").is_none());
    }

    #[test]
    fn test_class_info_names() {
        assert_eq!(class_info(ClassLabel::N).name, "Normal");
        assert_eq!(class_info(ClassLabel::As).name, "Aortic Stenosis");
    }

    #[test]
    fn test_example_serializes_type_field() {
        let json = serde_json::to_value(EXAMPLE_FILES[0]).unwrap();
        assert_eq!(json["type"], "AS");
        assert_eq!(json["filename"], "New_AS_029.wav");
    }
}
