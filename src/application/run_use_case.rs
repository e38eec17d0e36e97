// ============================================================
// Layer 2 — RunUseCase
// ============================================================
// One linear experiment: train, then submit with the model that
// is still in memory. No checkpoint reload between the two.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::{
    submit_use_case::{SubmitConfig, SubmitUseCase},
    train_use_case::{TrainConfig, TrainOutcome, TrainUseCase},
};
use crate::domain::submission::Submission;
use crate::ml::inferencer::Inferencer;

pub struct RunUseCase {
    train:  TrainConfig,
    output: PathBuf,
}

pub struct RunReport {
    pub outcome:    TrainOutcome,
    pub submission: Submission,
}

impl RunUseCase {
    pub fn new(train: TrainConfig, output: impl Into<PathBuf>) -> Self {
        Self { train, output: output.into() }
    }

    pub fn execute(&self) -> Result<RunReport> {
        let outcome = TrainUseCase::new(self.train.clone()).execute()?;

        let submit = SubmitUseCase::new(SubmitConfig {
            data_dir:       self.train.data_dir.clone().into(),
            checkpoint_dir: self.train.checkpoint_dir.clone().into(),
            output:         self.output.clone(),
        });
        let inferencer = Inferencer::new(
            outcome.model.clone(),
            outcome.artifacts.targets.task(),
            Default::default(),
        );
        let submission = submit.execute_with(&outcome.artifacts, &inferencer)?;

        Ok(RunReport { outcome, submission })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    use crate::application::submit_use_case::SubmitConfig;

    const TRAIN: &str = "\
id,Time_spent_Alone,Stage_fear,Social_event_attendance,Personality
0,4.0,No,6.0,Extrovert
1,9.0,Yes,1.0,Introvert
2,3.0,No,,Extrovert
";

    const TEST: &str = "\
id,Time_spent_Alone,Stage_fear,Social_event_attendance
10,8.0,Yes,2.0
11,2.0,No,7.0
12,5.0,,4.0
";

    fn toy_config(root: &std::path::Path) -> TrainConfig {
        TrainConfig {
            data_dir:       root.join("data").display().to_string(),
            checkpoint_dir: root.join("ckpt").display().to_string(),
            hidden_dims:    vec![8],
            batch_size:     2,
            epochs:         2,
            ..TrainConfig::default()
        }
    }

    fn write_toy(root: &std::path::Path) {
        // Nested layout: <data-dir>/dataset/*.csv
        let dir = root.join("data").join("dataset");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("train.csv"), TRAIN).unwrap();
        fs::write(dir.join("test.csv"), TEST).unwrap();
    }

    fn assert_valid(sub: &Submission) {
        assert_eq!(sub.header(), ["id", "Personality"]);
        assert_eq!(sub.len(), 3);
        let ids: HashSet<&str> = sub.ids().collect();
        assert_eq!(ids, HashSet::from(["10", "11", "12"]));
        for (_, values) in sub.rows() {
            assert!(values[0] == "Introvert" || values[0] == "Extrovert", "{values:?}");
        }
    }

    #[test]
    fn test_toy_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path());
        let output = tmp.path().join("submission.csv");

        let report = RunUseCase::new(toy_config(tmp.path()), &output).execute().unwrap();
        assert_valid(&report.submission);
        assert_eq!(report.submission.ids().collect::<Vec<_>>(), ["10", "11", "12"]);

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 4);
        assert!(written.starts_with("id,Personality\n10,"));
    }

    #[test]
    fn test_submit_from_checkpoint_follows_sample_order() {
        let tmp = tempfile::tempdir().unwrap();
        write_toy(tmp.path());
        fs::write(
            tmp.path().join("data").join("dataset").join("sample_submission.csv"),
            "id,Personality\n12,Extrovert\n10,Extrovert\n11,Extrovert\n",
        )
        .unwrap();
        let cfg = toy_config(tmp.path());
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let sub = SubmitUseCase::new(SubmitConfig {
            data_dir:       cfg.data_dir.into(),
            checkpoint_dir: cfg.checkpoint_dir.into(),
            output:         tmp.path().join("out").join("sub.csv"),
        })
        .execute()
        .unwrap();

        assert_valid(&sub);
        assert_eq!(sub.ids().collect::<Vec<_>>(), ["12", "10", "11"]);
    }

    #[test]
    fn test_multi_label_end_to_end_with_targets_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("train_features.csv"),
            "sig_id,cp_type,g-0,c-0\nid_a,trt_cp,0.5,-1.0\nid_b,ctl_vehicle,1.5,0.2\nid_c,trt_cp,-0.3,0.9\n",
        )
        .unwrap();
        // Rows deliberately in a different order than the features
        fs::write(
            dir.join("train_targets_scored.csv"),
            "sig_id,kinase_inhibitor,tubulin_inhibitor\nid_c,1,0\nid_a,0,1\nid_b,0,0\n",
        )
        .unwrap();
        fs::write(
            dir.join("test_features.csv"),
            "sig_id,cp_type,g-0,c-0\nt_1,trt_cp,0.1,0.1\nt_2,ctl_vehicle,-0.4,2.0\nt_3,trt_cp,0.9,-0.5\n",
        )
        .unwrap();
        fs::write(
            dir.join("sample_submission.csv"),
            "sig_id,tubulin_inhibitor,kinase_inhibitor\nt_3,0.5,0.5\nt_1,0.5,0.5\nt_2,0.5,0.5\n",
        )
        .unwrap();

        let cfg = TrainConfig { competition: crate::domain::competition::MOA.to_string(), ..toy_config(tmp.path()) };
        let output = tmp.path().join("submission.csv");
        let sub = RunUseCase::new(cfg, &output).execute().unwrap().submission;

        assert_eq!(sub.header(), ["sig_id", "tubulin_inhibitor", "kinase_inhibitor"]);
        assert_eq!(sub.ids().collect::<Vec<_>>(), ["t_3", "t_1", "t_2"]);
        for (_, values) in sub.rows() {
            assert_eq!(values.len(), 2);
            for v in values {
                let p: f64 = v.parse().unwrap();
                assert!((0.0..=1.0).contains(&p), "{v}");
            }
        }
        assert!(fs::read_to_string(&output).unwrap().starts_with("sig_id,tubulin_inhibitor,kinase_inhibitor\nt_3,"));
    }

    #[test]
    fn test_regression_end_to_end_from_layout_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("layout.json"),
            r#"{
                "competition":    "toy-prices",
                "task":           "regression",
                "id_column":      "id",
                "train_file":     "train.csv",
                "test_file":      "test.csv",
                "target_columns": ["price"]
            }"#,
        )
        .unwrap();
        fs::write(dir.join("train.csv"), "id,size,price\n1,10,100\n2,20,250\n3,30,400\n").unwrap();
        // Far outside the training range, decoded values must still be clamped
        fs::write(dir.join("test.csv"), "id,size\n7,1000\n8,-1000\n9,20\n").unwrap();

        let cfg = TrainConfig { competition: "toy-prices".to_string(), ..toy_config(tmp.path()) };
        let sub = RunUseCase::new(cfg, tmp.path().join("out.csv")).execute().unwrap().submission;

        assert_eq!(sub.header(), ["id", "price"]);
        assert_eq!(sub.ids().collect::<Vec<_>>(), ["7", "8", "9"]);
        for (id, values) in sub.rows() {
            let v: f64 = values[0].parse().unwrap();
            assert!((100.0..=400.0).contains(&v), "id {id}: {v}");
        }
    }
}
