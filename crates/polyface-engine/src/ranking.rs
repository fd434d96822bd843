use polyface_resolver::{CandidateMethod, ResolutionModel};
use polyface_types::{comparer::TypeComparer, runtime::RuntimeType, value::Value, TypeUniverse};
use std::{cmp::Ordering, sync::Arc};

/// Runtime types of the actual arguments, `None` for nulls.
pub fn argument_types(args: &[Value]) -> Box<[Option<RuntimeType>]> {
    args.iter().map(Value::runtime_type).collect()
}

/// Static ranking rules for the candidates of one model.
pub struct Ranking<'m> {
    comparer: TypeComparer<'m>,
    universe: &'m TypeUniverse,
    facade_namespace: &'m str,
}

impl<'m> Ranking<'m> {
    pub fn new(model: &'m ResolutionModel) -> Self {
        let universe = model.universe().as_ref();
        Self {
            comparer: TypeComparer::new(universe),
            universe,
            facade_namespace: model.facade_namespace(),
        }
    }

    /// Whether every parameter of `candidate` can receive the argument it is mapped to.
    /// A null argument fits any non-primitive parameter.
    pub fn is_compatible(
        &self,
        candidate: &CandidateMethod,
        argument_types: &[Option<RuntimeType>],
    ) -> bool {
        candidate
            .parameter_types
            .iter()
            .zip(candidate.param_index.iter())
            .all(|(parameter, &index)| match argument_types.get(index) {
                None => false,
                Some(None) => !parameter.is_primitive(),
                Some(Some(argument)) => self.comparer.is_boxed_assignable(parameter, argument),
            })
    }

    fn is_co_located(&self, candidate: &CandidateMethod) -> bool {
        self.universe
            .definition(candidate.provider)
            .namespace
            .starts_with(self.facade_namespace)
    }

    /// Tie-break between two candidates: positive when `a` should be preferred.
    ///
    /// Parameter closeness counts first, then declaring a validity method, then not
    /// sharing the facade's namespace.
    pub fn rank(&self, a: &CandidateMethod, b: &CandidateMethod) -> i32 {
        let mut a_closer = 0i32;
        let mut b_closer = 0i32;
        for (ta, index) in a.parameter_types.iter().zip(a.param_index.iter()) {
            let Some(position) = b.param_index.iter().position(|i| i == index) else {
                continue;
            };
            let tb = &b.parameter_types[position];
            if ta == tb {
                continue;
            }
            if self.comparer.is_strict_subtype(ta, tb) {
                a_closer += 1;
            } else if self.comparer.is_strict_subtype(tb, ta) {
                b_closer += 1;
            } else {
                match (ta.is_primitive(), tb.is_primitive()) {
                    (true, false) => a_closer += 1,
                    (false, true) => b_closer += 1,
                    _ => {}
                }
            }
        }
        let closeness = a_closer - b_closer;
        if closeness != 0 {
            return closeness;
        }

        match (a.has_validity(), b.has_validity()) {
            (true, false) => return 1,
            (false, true) => return -1,
            _ => {}
        }

        match (self.is_co_located(a), self.is_co_located(b)) {
            (false, true) => 1,
            (true, false) => -1,
            _ => 0,
        }
    }

    /// Whether `challenger` displaces `current` given their effective priorities.
    /// Equal priority and an equal rank favour the challenger.
    pub fn displaces(
        &self,
        challenger: &CandidateMethod,
        challenger_priority: i32,
        current: &CandidateMethod,
        current_priority: i32,
    ) -> bool {
        match challenger_priority.cmp(&current_priority) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.rank(challenger, current) >= 0,
        }
    }

    /// The compatible candidates ordered by fixed priority then [`rank`](Self::rank), best
    /// first. Each candidate is inserted ahead of the first entry it displaces, so the
    /// head of the list is the candidate a running-best scan over `candidates` would keep.
    pub fn static_order<'c>(
        &self,
        candidates: impl IntoIterator<Item = &'c Arc<CandidateMethod>>,
        argument_types: &[Option<RuntimeType>],
    ) -> Vec<Arc<CandidateMethod>> {
        let mut ordered: Vec<Arc<CandidateMethod>> = vec![];
        for candidate in candidates {
            if !self.is_compatible(candidate, argument_types) {
                continue;
            }
            let slot = ordered
                .iter()
                .position(|existing| {
                    self.displaces(candidate, candidate.priority, existing, existing.priority)
                })
                .unwrap_or(ordered.len());
            ordered.insert(slot, candidate.clone());
        }
        ordered
    }
}
