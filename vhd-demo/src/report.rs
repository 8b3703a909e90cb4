//! Plain-text rendering of prediction results and the example catalog

use std::fmt::Write;
use vhd_common::api::PredictionResult;
use vhd_common::catalog::{class_info, ExampleFile, MEDICAL_DISCLAIMER};

const BAR_WIDTH: usize = 30;

fn bar(probability: f64) -> String {
    let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Render a result for the terminal
///
/// The headline and the highlighted row both follow `prediction`, even when
/// it disagrees with the largest probability.
pub fn render_result(result: &PredictionResult) -> String {
    let info = class_info(result.prediction);
    let mut out = String::new();

    let _ = writeln!(out, "File:       {}", result.filename);
    let _ = writeln!(out, "Diagnosis:  {} ({})", info.name, info.label);
    let _ = writeln!(out, "            {}", info.description);
    let _ = writeln!(out, "Confidence: {:.1}%", result.confidence * 100.0);
    let _ = writeln!(out);
    let _ = writeln!(out, "Probabilities:");

    for (label, probability) in result.probabilities.sorted_desc() {
        let marker = if label == result.prediction { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:<4} {:<22} {:>6.2}% {}",
            marker,
            label.as_str(),
            class_info(label).name,
            probability * 100.0,
            bar(probability)
        );
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", MEDICAL_DISCLAIMER);
    out
}

/// Render the example catalog, one line per recording
pub fn render_examples(examples: &[ExampleFile]) -> String {
    let mut out = String::new();
    for example in examples {
        let _ = writeln!(
            out,
            "{:<4} {:<24} {}",
            example.label.as_str(),
            example.name,
            example.filename
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vhd_common::api::{ClassLabel, Probabilities};
    use vhd_common::catalog::EXAMPLE_FILES;

    fn normal_result() -> PredictionResult {
        PredictionResult {
            filename: "New_N_020.wav".to_string(),
            prediction: ClassLabel::N,
            class_id: 4,
            confidence: 0.91,
            probabilities: Probabilities {
                aortic_stenosis: 0.02,
                mitral_regurgitation: 0.03,
                mitral_stenosis: 0.01,
                mitral_valve_prolapse: 0.03,
                normal: 0.91,
            },
        }
    }

    #[test]
    fn test_render_headline_and_confidence() {
        let text = render_result(&normal_result());

        assert!(text.contains("File:       New_N_020.wav"));
        assert!(text.contains("Diagnosis:  Normal (N)"));
        assert!(text.contains("Confidence: 91.0%"));
        assert!(text.ends_with(MEDICAL_DISCLAIMER));
    }

    #[test]
    fn test_probabilities_sorted_descending() {
        let text = render_result(&normal_result());
        let rows: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "Probabilities:")
            .skip(1)
            .take(5)
            .collect();

        assert!(rows[0].starts_with("> N "));
        assert!(rows[0].contains("91.00%"));
        assert!(rows[4].contains("MS"));
        assert!(rows[4].contains("1.00%"));
    }

    #[test]
    fn test_report_trusts_prediction_over_argmax() {
        let mut result = normal_result();
        result.prediction = ClassLabel::Mvp;
        assert_eq!(result.probabilities.argmax(), ClassLabel::N);

        let text = render_result(&result);
        assert!(text.contains("Diagnosis:  Mitral Valve Prolapse (MVP)"));

        let highlighted: Vec<&str> = text.lines().filter(|l| l.starts_with('>')).collect();
        assert_eq!(highlighted.len(), 1);
        assert!(highlighted[0].contains("MVP"));
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(bar(1.0), "#".repeat(BAR_WIDTH));
        assert_eq!(bar(1.5).len(), BAR_WIDTH);
    }

    #[test]
    fn test_render_examples_lists_all() {
        let text = render_examples(&EXAMPLE_FILES);
        assert_eq!(text.lines().count(), EXAMPLE_FILES.len());
        assert!(text.contains("New_MVP_017.wav"));
        assert!(text.contains("Normal Heart"));
    }
}
