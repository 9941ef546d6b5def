// tests/pipeline_properties.rs

use proptest::prelude::*;

use hotlap::errors::PipelineError;
use hotlap_test_utils::builders::pipeline_of;
use hotlap_test_utils::fake_actions::{FakeBuild, FakeRun, Recorder};

/// Events a fully successful run would produce, in order.
fn full_sequence(pre: usize, has_run: bool, post: usize) -> Vec<String> {
    let mut seq: Vec<String> = (0..pre).map(|i| format!("pre{i}")).collect();
    if has_run {
        seq.push("start:app".to_string());
    }
    seq.extend((0..post).map(|i| format!("post{i}")));
    seq
}

proptest! {
    #[test]
    fn phases_short_circuit_and_never_leak_the_app(
        pre_fails in proptest::collection::vec(any::<bool>(), 0..5),
        has_run in any::<bool>(),
        run_fails in any::<bool>(),
        post_fails in proptest::collection::vec(any::<bool>(), 0..5),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        let rec = Recorder::new();
        let pre: Vec<FakeBuild> = pre_fails
            .iter()
            .enumerate()
            .map(|(i, &fail)| {
                let step = FakeBuild::new(&format!("pre{i}"), &rec);
                if fail { step.failing() } else { step }
            })
            .collect();
        let run = has_run.then(|| {
            let run = FakeRun::new("app", &rec);
            if run_fails { run.failing() } else { run }
        });
        let post: Vec<FakeBuild> = post_fails
            .iter()
            .enumerate()
            .map(|(i, &fail)| {
                let step = FakeBuild::new(&format!("post{i}"), &rec);
                if fail { step.failing() } else { step }
            })
            .collect();

        let pipeline = pipeline_of(pre, run, post);
        let result = rt.block_on(pipeline.execute());

        let first_pre_fail = pre_fails.iter().position(|&f| f);
        let run_failed = first_pre_fail.is_none() && has_run && run_fails;
        let first_post_fail = if first_pre_fail.is_none() && !run_failed {
            post_fails.iter().position(|&f| f)
        } else {
            None
        };

        // Everything before and including the failing step ran, nothing after.
        let full = full_sequence(pre_fails.len(), has_run, post_fails.len());
        let ran = match (first_pre_fail, run_failed, first_post_fail) {
            (Some(i), _, _) => i + 1,
            (None, true, _) => pre_fails.len() + 1,
            (None, false, Some(i)) => pre_fails.len() + usize::from(has_run) + i + 1,
            (None, false, None) => full.len(),
        };
        let mut expected = full[..ran].to_vec();

        let app_started = has_run && first_pre_fail.is_none() && !run_failed;
        if app_started && first_post_fail.is_some() {
            expected.push("stop:app".to_string());
        }
        prop_assert_eq!(rec.events(), expected);
        prop_assert!(rec.count("stop:app") <= 1);

        match result {
            Ok(handle) => {
                prop_assert!(first_pre_fail.is_none() && !run_failed && first_post_fail.is_none());
                prop_assert_eq!(handle.is_some(), has_run);
            }
            Err(PipelineError::PreBuild { index, .. }) => {
                prop_assert_eq!(Some(index), first_pre_fail);
            }
            Err(PipelineError::RunStart(_)) => prop_assert!(run_failed),
            Err(PipelineError::PostBuild { index, .. }) => {
                prop_assert_eq!(Some(index), first_post_fail);
            }
        }
    }
}
