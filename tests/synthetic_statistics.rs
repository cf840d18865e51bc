use approx::assert_relative_eq;

use mnlrs::synthetic::{synthetic_data, synthetic_data_uniform, synthetic_model};

/// Choices from the correlated generator must track deterministic utility:
/// with independent Gumbel noise, the alternative with the larger
/// parameter-variable product is chosen more than half the time. Several
/// seeds are pooled so the check does not hinge on one covariance draw.
#[test]
fn correlated_choices_favor_the_higher_utility_alternative() {
    let model = synthetic_model("Correlated", 2, 1);
    let parameter = -1.5; // -1.5 divided by one parameter
    let observations_per_seed = 10_000;

    let mut matches = 0usize;
    let mut total = 0usize;
    for seed in 1..=5u64 {
        let data = synthetic_data(&model, observations_per_seed, seed);
        let first = data.numeric("alternative1_variable1").unwrap();
        let second = data.numeric("alternative2_variable1").unwrap();
        let choices = data.labels("choice").unwrap();

        for row in 0..observations_per_seed {
            let better = if parameter * first[row] > parameter * second[row] {
                "alternative1"
            } else {
                "alternative2"
            };
            if choices[row] == better {
                matches += 1;
            }
            total += 1;
        }
    }

    let fraction = matches as f64 / total as f64;
    assert!(
        fraction > 0.5,
        "chose the higher-utility alternative in only {fraction} of observations"
    );
}

/// The uniform generator produces choices unrelated to the variables, so
/// every alternative should be picked in roughly equal shares.
#[test]
fn uniform_choice_frequencies_are_balanced() {
    let n_alternatives = 3;
    let n_observations = 30_000;
    let model = synthetic_model("Uniform", n_alternatives, 2);
    let data = synthetic_data_uniform(&model, n_observations, 99);

    let choices = data.labels("choice").unwrap();
    for alternative in model.alternatives() {
        let count = choices.iter().filter(|label| *label == alternative).count();
        let frequency = count as f64 / n_observations as f64;
        assert_relative_eq!(
            frequency,
            1.0 / n_alternatives as f64,
            epsilon = 0.02
        );
    }
}
