use matrix_survival::persist::{self, GenomeArchive};
use matrix_survival::trainer::{evaluate, select};
use matrix_survival::{Action, CancelToken, Config, Genome, Scored, Trainer};

fn quick_config() -> Config {
    let mut config = Config::with_size(5, 5);
    config.seed = Some(1234);
    config.training.population_size = 40;
    config.training.survivors = 10;
    config.training.generations = 4;
    config.training.trials = 3;
    config.training.report_top = 10;
    config
}

#[test]
fn truncation_selection_scenario() {
    let population: Vec<Scored> = [10, 40, 30, 20]
        .into_iter()
        .zip([Action::Forward, Action::TurnLeft, Action::TurnRight, Action::Forward])
        .map(|(fitness, a)| Scored {
            genome: Genome::uniform(a),
            fitness,
        })
        .collect();
    let top: Vec<u32> = select(population, 2).iter().map(|s| s.fitness).collect();
    assert_eq!(top, vec![40, 30]);
}

#[test]
fn training_reports_progress_every_generation() {
    let mut trainer = Trainer::new(quick_config()).unwrap();
    let mut generations = Vec::new();
    let mut sizes = Vec::new();
    let report = trainer
        .train(&CancelToken::new(), |p| {
            generations.push(p.generation);
            sizes.push(p.evaluated);
        })
        .unwrap();
    assert_eq!(generations, vec![0, 1, 2, 3]);
    // seed population first, then survivors plus their children
    assert_eq!(sizes, vec![40, 20, 20, 20]);
    assert_eq!(report.generations_completed, 4);
    assert_eq!(report.ranked.len(), 10);
    assert_eq!(trainer.population().len(), 20);

    // The champion re-scores within the arena's bounds.
    let champion = &report.ranked[0];
    let again = evaluate(trainer.config(), &champion.genome, 5).unwrap();
    assert!((1..=25).contains(&again));
}

#[test]
fn seeded_training_is_reproducible() {
    let run = || {
        Trainer::new(quick_config())
            .unwrap()
            .train(&CancelToken::new(), |_| {})
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn trained_archive_survives_persistence() {
    let config = quick_config();
    let report = Trainer::new(config.clone())
        .unwrap()
        .train(&CancelToken::new(), |_| {})
        .unwrap();
    let archive = GenomeArchive::from_report(config.width, config.height, &report);

    let mut json = Vec::new();
    persist::write_json(&mut json, &archive).unwrap();
    assert_eq!(persist::read_json(&json[..]).unwrap(), archive);

    let mut bin = Vec::new();
    persist::write_binary(&mut bin, &archive).unwrap();
    assert!(bin.len() < json.len());
    assert_eq!(persist::read_binary(&bin[..]).unwrap(), archive);
}

#[test]
fn seeding_from_known_genomes() {
    let mut config = quick_config();
    config.training.survivors = 2;
    config.training.generations = 1;
    config.training.report_top = 2;
    let genomes = vec![
        Genome::uniform(Action::Forward),
        Genome::uniform(Action::TurnLeft),
        Genome::uniform(Action::TurnRight),
    ];
    let mut trainer = Trainer::with_population(config, genomes).unwrap();
    let report = trainer.train(&CancelToken::new(), |_| {}).unwrap();
    // Genomes that only turn never leave B's corner.
    let spinner = report
        .ranked
        .iter()
        .find(|s| s.genome != Genome::uniform(Action::Forward))
        .expect("two survivors out of three always include a turning genome");
    assert_eq!(spinner.fitness, 1);
    assert_eq!(trainer.population().len(), 4);
}
