use zonegrid::{
    engine::Termination,
    report,
    scenario::ScenarioLoader,
};

#[test]
fn engine_runs_hook_each_step() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader
        .load("scenarios/block3.yaml")
        .expect("scenario should load");
    let mut city = scenario.build_city().expect("layout should decode");
    let mut engine = scenario.build_engine();

    let mut steps = Vec::new();
    let mut grids = Vec::new();
    let summary = engine
        .run_with_hook(&mut city, |step, city| {
            steps.push(step.step);
            grids.push(city.populations());
        })
        .expect("run succeeds");

    assert_eq!(steps, vec![1, 2, 3, 4, 5]);
    assert_eq!(grids[0], vec![1; 9]);
    assert_eq!(grids[1], vec![2; 9]);
    assert_eq!(grids[2], vec![3; 9]);
    assert_eq!(grids[3], vec![3, 4, 3, 4, 4, 4, 3, 4, 3]);
    assert_eq!(grids[4], grids[3]);
    assert_eq!(summary.steps, 5);
    assert_eq!(summary.termination, Termination::FixedPoint);
    assert_eq!(summary.pools.workers, 32);

    let stats = report::final_stats(&city);
    assert!(stats.contains("Total Residential Population: 32\n"));
    assert!(stats.contains("Total Pollution: 0\n"));
}

#[test]
fn refresh_reports_follow_the_interval() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let mut scenario = loader.load("scenarios/block3.yaml").unwrap();
    scenario.refresh_rate = 2;
    let mut city = scenario.build_city().unwrap();
    let mut engine = scenario.build_engine();

    let mut refreshed = Vec::new();
    engine
        .run_with_hook(&mut city, |step, city| {
            if step.refresh {
                refreshed.push(report::refresh(step, city));
            }
        })
        .unwrap();

    assert_eq!(refreshed.len(), 2);
    assert_eq!(
        refreshed[0],
        "Time step: 2\nAvailable workers: 9\nAvailable goods: 0\n2,2,2\n2,2,2\n2,2,2\n"
    );
    assert!(refreshed[1].starts_with("Time step: 4\n"));
}
