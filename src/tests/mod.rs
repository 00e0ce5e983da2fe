mod attribute_set;
