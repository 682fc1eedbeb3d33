//! Test utilities for building chart text and play sessions.

pub mod builders {
    use crate::bms::{Chart, Note, compile, parse_chart};
    use crate::game::{HoldTailPolicy, JudgeConfig, PlaySession, ScoringRules};

    /// Builder for BMS chart text.
    #[derive(Debug, Clone, Default)]
    pub struct ChartTextBuilder {
        lines: Vec<String>,
    }

    impl ChartTextBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn header(mut self, key: &str, value: &str) -> Self {
            self.lines.push(format!("#{key} {value}"));
            self
        }

        pub fn bpm(self, bpm: f64) -> Self {
            self.header("BPM", &bpm.to_string())
        }

        /// Add a grid line: `#mmmcc:data`.
        pub fn grid(mut self, measure: u32, channel: &str, data: &str) -> Self {
            self.lines.push(format!("#{measure:03}{channel}:{data}"));
            self
        }

        pub fn text(&self) -> String {
            self.lines.join("\n")
        }

        pub fn compile(&self) -> Chart {
            compile(&parse_chart(&self.text()))
        }
    }

    /// Builder for play sessions over hand-written notes.
    #[derive(Debug, Clone, Default)]
    pub struct SessionBuilder {
        notes: Vec<Note>,
        judge: JudgeConfig,
        rules: ScoringRules,
        hold_tail: HoldTailPolicy,
    }

    impl SessionBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn tap(mut self, time: f64, lane: usize) -> Self {
            self.notes.push(Note::tap(time, lane));
            self
        }

        pub fn hold(mut self, time: f64, lane: usize, duration: f64) -> Self {
            self.notes.push(Note::hold(time, lane, duration));
            self
        }

        pub fn judge(mut self, judge: JudgeConfig) -> Self {
            self.judge = judge;
            self
        }

        pub fn rules(mut self, rules: ScoringRules) -> Self {
            self.rules = rules;
            self
        }

        pub fn hold_tail(mut self, policy: HoldTailPolicy) -> Self {
            self.hold_tail = policy;
            self
        }

        pub fn build(self) -> PlaySession {
            PlaySession::new(self.notes, self.judge, self.rules, self.hold_tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builders::*;

    #[test]
    fn chart_text_builder_formats_lines() {
        let text = ChartTextBuilder::new()
            .bpm(150.0)
            .grid(1, "11", "01")
            .text();
        assert_eq!(text, "#BPM 150\n#00111:01");
    }

    #[test]
    fn session_builder_sorts_notes() {
        let session = SessionBuilder::new().tap(2.0, 0).tap(1.0, 1).build();
        assert_eq!(session.notes()[0].lane, 1);
    }
}
