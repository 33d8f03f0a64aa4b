mod test_field_basic;
mod test_profile_basic;
mod test_specular_basic;
