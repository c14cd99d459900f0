use k8_types::apiextensions::ConditionStatus;
use k8_types::apiextensions::CrdConditionType;
use k8_types::apiextensions::CustomResourceDefinition;
use k8_types::apiextensions::CustomResourceDefinitionCondition;

pub fn find_crd_condition(
    crd: &CustomResourceDefinition,
    condition_type: CrdConditionType,
) -> Option<&CustomResourceDefinitionCondition> {
    crd.status.find_condition(condition_type)
}

pub fn is_crd_condition_true(
    crd: &CustomResourceDefinition,
    condition_type: CrdConditionType,
) -> bool {
    is_crd_condition_present_and_equal(crd, condition_type, ConditionStatus::True)
}

pub fn is_crd_condition_false(
    crd: &CustomResourceDefinition,
    condition_type: CrdConditionType,
) -> bool {
    is_crd_condition_present_and_equal(crd, condition_type, ConditionStatus::False)
}

pub fn is_crd_condition_present_and_equal(
    crd: &CustomResourceDefinition,
    condition_type: CrdConditionType,
    status: ConditionStatus,
) -> bool {
    crd.status.is_condition_present_and_equal(condition_type, status)
}

/// set or replace condition, keeping the old transition time if status did not change
pub fn set_crd_condition(
    crd: &mut CustomResourceDefinition,
    condition: CustomResourceDefinitionCondition,
) {
    crd.status.set_condition(condition);
}

pub fn remove_crd_condition(crd: &mut CustomResourceDefinition, condition_type: CrdConditionType) {
    crd.status.remove_condition(condition_type);
}

#[cfg(test)]
mod test {

    use k8_types::apiextensions::ConditionStatus;
    use k8_types::apiextensions::CrdConditionType;
    use k8_types::apiextensions::CustomResourceDefinition;
    use k8_types::apiextensions::CustomResourceDefinitionCondition;

    use super::*;

    #[test]
    fn test_condition_helpers() {
        let mut crd = CustomResourceDefinition::default();
        assert!(find_crd_condition(&crd, CrdConditionType::Established).is_none());
        assert!(!is_crd_condition_true(&crd, CrdConditionType::Established));
        assert!(!is_crd_condition_false(&crd, CrdConditionType::Established));

        set_crd_condition(
            &mut crd,
            CustomResourceDefinitionCondition::new(
                CrdConditionType::Established,
                ConditionStatus::True,
            ),
        );
        assert!(is_crd_condition_true(&crd, CrdConditionType::Established));

        set_crd_condition(
            &mut crd,
            CustomResourceDefinitionCondition::new(
                CrdConditionType::NamesAccepted,
                ConditionStatus::False,
            ),
        );
        assert!(is_crd_condition_false(&crd, CrdConditionType::NamesAccepted));
        // a rename conflict does not undo establishment
        assert!(is_crd_condition_true(&crd, CrdConditionType::Established));

        remove_crd_condition(&mut crd, CrdConditionType::NamesAccepted);
        assert!(find_crd_condition(&crd, CrdConditionType::NamesAccepted).is_none());
        assert_eq!(crd.status.conditions.len(), 1);
    }
}
