//! Synthetic choice models and observation tables drawn from a known
//! random-utility process, used to validate estimation backends.

use nalgebra::{DMatrix, DVector};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gumbel, StandardNormal};

use crate::data::{Observations, ObservationsBuilder};
use crate::model::{ChoiceModel, ChoiceModelBuilder};
use crate::utility::{UtilitySpecification, UtilityTerm};

/// Builds a synthetic multinomial logit model.
///
/// The model has `number_of_alternatives` alternatives named
/// `alternative1..`, one availability column per alternative, one
/// alternative-dependent variable per requested variable (with one column
/// per alternative named `<alternative>_<variable>`), one parameter per
/// variable, and an intercept on every alternative except the last. Each
/// alternative's utility is its intercept (if any) plus the sum of
/// parameter-variable products over all variables.
pub fn synthetic_model(
    title: &str,
    number_of_alternatives: usize,
    number_of_variables: usize,
) -> ChoiceModel {
    let alternatives: Vec<String> = (1..=number_of_alternatives)
        .map(|number| format!("alternative{number}"))
        .collect();

    let mut builder = ChoiceModelBuilder::new(title, alternatives.clone(), "choice");

    for (index, alternative) in alternatives.iter().enumerate() {
        builder = builder.availability(alternative, format!("availability{}", index + 1));
    }
    for number in 1..=number_of_variables {
        let columns = alternatives
            .iter()
            .map(|alternative| {
                (
                    alternative.clone(),
                    format!("{alternative}_variable{number}"),
                )
            })
            .collect();
        builder = builder.dependent_variable(format!("variable{number}"), columns);
    }
    for (index, alternative) in alternatives.iter().enumerate() {
        if index + 1 < alternatives.len() {
            builder = builder.intercept(alternative, format!("c{}", index + 1));
        }
    }
    for number in 1..=number_of_variables {
        builder = builder.parameter(format!("parameter{number}"));
    }

    let terms: Vec<UtilityTerm> = (1..=number_of_variables)
        .map(|number| UtilityTerm::new(format!("parameter{number}"), format!("variable{number}")))
        .collect();
    for (index, alternative) in alternatives.iter().enumerate() {
        let intercept = if index + 1 < alternatives.len() {
            Some(format!("c{}", index + 1))
        } else {
            None
        };
        let utility = UtilitySpecification::new(intercept, terms.clone())
            .expect("synthetic utility terms are unique");
        builder = builder.utility(alternative, utility);
    }

    builder.build().expect("synthetic model is internally consistent")
}

/// Generates observations whose choices follow the model's utility process.
///
/// For each observation and alternative the variable vector is drawn from a
/// multivariate normal with mean 5 in every component and covariance `AᵀA`,
/// where the entries of `A` are uniform in `[-1, 1)` (sampling `mean + Aᵀz`
/// with standard-normal `z` realizes exactly that covariance). All
/// parameters are fixed at `-1.5` divided by the parameter count. The
/// recorded choice is the alternative maximizing the parameter-variable dot
/// product plus independent standard Gumbel noise, reproducing a
/// logit-consistent process. Every alternative is marked available.
pub fn synthetic_data(model: &ChoiceModel, n_observations: usize, seed: u64) -> Observations {
    let n_alternatives = model.number_of_alternatives();
    let n_variables = model.dependent_variables().len();
    let n_parameters = model.number_of_parameters(false);
    let mut rng = SmallRng::seed_from_u64(seed);

    let mean = DVector::from_element(n_variables, 5.0);
    let a = DMatrix::from_fn(n_variables, n_variables, |_, _| rng.gen_range(-1.0..1.0));
    let a_t = a.transpose();
    let parameters = DVector::from_element(n_parameters, -1.5 / n_parameters as f64);
    let gumbel: Gumbel<f64> = Gumbel::new(0.0, 1.0).expect("standard Gumbel parameters are valid");

    // Variable values per (variable, alternative) column.
    let mut columns = vec![vec![0.0f64; n_observations]; n_variables * n_alternatives];
    let mut choices = Vec::with_capacity(n_observations);

    for observation in 0..n_observations {
        let mut best: Option<(usize, f64)> = None;
        for alternative in 0..n_alternatives {
            let z = DVector::from_fn(n_variables, |_, _| StandardNormal.sample(&mut rng));
            let draw = &mean + &a_t * z;
            for variable in 0..n_variables {
                columns[variable * n_alternatives + alternative][observation] = draw[variable];
            }

            let utility = parameters.dot(&draw) + gumbel.sample(&mut rng);
            if best.map_or(true, |(_, value)| utility > value) {
                best = Some((alternative, utility));
            }
        }
        let (chosen, _) = best.expect("at least one alternative");
        choices.push(model.alternatives()[chosen].clone());
    }

    let mut builder = ObservationsBuilder::new();
    for (variable_index, variable) in model.dependent_variables().iter().enumerate() {
        for (alternative_index, alternative) in model.alternatives().iter().enumerate() {
            let column = variable
                .column(alternative)
                .expect("synthetic variables cover every alternative");
            builder = builder.numeric(
                column,
                columns[variable_index * n_alternatives + alternative_index].clone(),
            );
        }
    }
    for field in model.availability_fields() {
        builder = builder.numeric(field, vec![1.0; n_observations]);
    }
    builder = builder.labels(model.choice_column(), choices);

    builder.build().expect("columns share the observation count")
}

/// Generates observations with no relationship between variables and choice:
/// choices uniform over the alternatives, variables uniform in `[0, 1)`.
pub fn synthetic_data_uniform(
    model: &ChoiceModel,
    n_observations: usize,
    seed: u64,
) -> Observations {
    let mut rng = SmallRng::seed_from_u64(seed);
    let alternatives = model.alternatives();

    let choices: Vec<String> = (0..n_observations)
        .map(|_| alternatives[rng.gen_range(0..alternatives.len())].clone())
        .collect();

    let mut builder = ObservationsBuilder::new();
    for field in model.all_variable_fields() {
        let values: Vec<f64> = (0..n_observations).map(|_| rng.gen::<f64>()).collect();
        builder = builder.numeric(field, values);
    }
    for field in model.availability_fields() {
        builder = builder.numeric(field, vec![1.0; n_observations]);
    }
    builder = builder.labels(model.choice_column(), choices);

    builder.build().expect("columns share the observation count")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_follows_the_naming_scheme() {
        let model = synthetic_model("Example Title", 2, 3);

        assert_eq!(model.title(), "Example Title");
        assert_eq!(model.alternatives(), ["alternative1", "alternative2"]);
        assert_eq!(model.choice_column(), "choice");
        assert_eq!(
            model.availability_fields(),
            ["availability1", "availability2"]
        );
        assert_eq!(
            model.all_variables(),
            ["variable1", "variable2", "variable3"]
        );
        assert_eq!(
            model.dependent_variable_fields(),
            [
                "alternative1_variable1",
                "alternative2_variable1",
                "alternative1_variable2",
                "alternative2_variable2",
                "alternative1_variable3",
                "alternative2_variable3",
            ]
        );
        assert_eq!(model.intercept_names(), ["c1"]);
        assert_eq!(
            model.parameters(),
            ["parameter1", "parameter2", "parameter3"]
        );
        assert_eq!(model.number_of_parameters(true), 4);
        assert_eq!(model.number_of_parameters(false), 3);
        assert_eq!(model.utility("alternative2").intercept(), None);
    }

    #[test]
    fn correlated_data_has_valid_choices_and_availabilities() {
        let model = synthetic_model("Example", 3, 2);
        let data = synthetic_data(&model, 25, 7);

        assert_eq!(data.len(), 25);
        for field in model.availability_fields() {
            assert!(data.numeric(field).unwrap().iter().all(|&value| value == 1.0));
        }
        for label in data.labels("choice").unwrap() {
            assert!(model.alternatives().contains(label));
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let model = synthetic_model("Example", 2, 2);
        let first = synthetic_data(&model, 10, 42);
        let second = synthetic_data(&model, 10, 42);

        for field in model.all_variable_fields() {
            assert_eq!(first.numeric(field), second.numeric(field));
        }
        assert_eq!(first.labels("choice"), second.labels("choice"));
    }

    #[test]
    fn uniform_data_fills_every_model_field() {
        let model = synthetic_model("Example", 2, 2);
        let data = synthetic_data_uniform(&model, 10, 3);

        assert_eq!(data.len(), 10);
        for field in model.all_variable_fields() {
            let values = data.numeric(field).unwrap();
            assert!(values.iter().all(|&value| (0.0..1.0).contains(&value)));
        }
    }
}
